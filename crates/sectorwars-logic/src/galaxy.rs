//! Deterministic universe seeding.
//!
//! Sectors are numbered `1..=sector_count`. Sector 1 hosts the Stardock. A
//! two-way ring keeps every sector reachable; extra one-way and two-way
//! warps are sprinkled on top from the seed. Roughly half the remaining
//! sectors get a trading port with random type, stock and demand.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::config::GameRules;
use crate::navigation::WarpEdge;
use crate::pricing::PortType;
use crate::trade::PortStock;

pub const STARDOCK_SECTOR: u32 = 1;
const PORT_CHANCE: f64 = 0.55;
const EXTRA_WARP_CHANCE: f64 = 0.6;

const NAME_STEMS: [&str; 12] = [
    "Aldebaran", "Vega", "Rigel", "Castor", "Mira", "Tau", "Deneb", "Sirius", "Altair", "Hadar",
    "Procyon", "Izar",
];
const NAME_SUFFIXES: [&str; 6] = ["Depot", "Exchange", "Outpost", "Station", "Market", "Hub"];

#[derive(Debug, Clone, PartialEq)]
pub struct SectorSeed {
    pub sector_number: u32,
    pub port: Option<PortStock>,
    pub port_name: Option<String>,
    pub port_class: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GalaxyPlan {
    pub sectors: Vec<SectorSeed>,
    pub warps: Vec<WarpEdge>,
}

/// Port class: 1..=8 for the trading codes in `PortType::all_trading` order,
/// 9 for the Stardock, 0 for no port.
pub fn port_class(port: Option<&PortType>) -> u8 {
    match port {
        None => 0,
        Some(PortType::Stardock) => 9,
        Some(p) => PortType::all_trading()
            .iter()
            .position(|t| t == p)
            .map_or(0, |i| i as u8 + 1),
    }
}

pub fn generate(sector_count: u32, seed: u64, rules: &GameRules) -> GalaxyPlan {
    let mut rng = StdRng::seed_from_u64(seed);
    let trading = PortType::all_trading();
    let mut sectors = Vec::with_capacity(sector_count as usize);

    for n in 1..=sector_count {
        let port = if n == STARDOCK_SECTOR {
            Some(PortStock {
                port_type: PortType::Stardock,
                stock: [0; 3],
                demand_pct: [100; 3],
            })
        } else if rng.gen_bool(PORT_CHANCE) {
            let port_type = *trading.choose(&mut rng).unwrap_or(&trading[0]);
            let mut stock = [0u32; 3];
            let mut demand_pct = [100u32; 3];
            for i in 0..3 {
                stock[i] = rng.gen_range(rules.port_regen_min..=rules.port_regen_max);
                demand_pct[i] = rng.gen_range(80..=120);
            }
            Some(PortStock {
                port_type,
                stock,
                demand_pct,
            })
        } else {
            None
        };
        let port_name = port.as_ref().map(|p| {
            if p.port_type.is_stardock() {
                "Stardock".to_string()
            } else {
                let stem = NAME_STEMS.choose(&mut rng).copied().unwrap_or("Frontier");
                let suffix = NAME_SUFFIXES.choose(&mut rng).copied().unwrap_or("Post");
                format!("{} {}", stem, suffix)
            }
        });
        sectors.push(SectorSeed {
            sector_number: n,
            port_name,
            port_class: port_class(port.as_ref().map(|p| &p.port_type)),
            port,
        });
    }

    let mut warps = Vec::new();
    if sector_count >= 2 {
        for n in 1..sector_count {
            warps.push(WarpEdge::two_way(n, n + 1));
        }
        if sector_count > 2 {
            warps.push(WarpEdge::two_way(sector_count, 1));
        }
        for n in 1..=sector_count {
            if !rng.gen_bool(EXTRA_WARP_CHANCE) {
                continue;
            }
            let to = rng.gen_range(1..=sector_count);
            if to == n || warps.iter().any(|w| w.allows(n, to)) {
                continue;
            }
            if rng.gen_bool(0.5) {
                warps.push(WarpEdge::two_way(n, to));
            } else {
                warps.push(WarpEdge::one_way(n, to));
            }
        }
    }

    GalaxyPlan { sectors, warps }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::neighbors;
    use std::collections::{HashSet, VecDeque};

    #[test]
    fn test_deterministic_for_seed() {
        let rules = GameRules::default();
        assert_eq!(generate(50, 9, &rules), generate(50, 9, &rules));
        assert_ne!(generate(50, 9, &rules), generate(50, 10, &rules));
    }

    #[test]
    fn test_sector_one_is_stardock() {
        let plan = generate(20, 1, &GameRules::default());
        let first = &plan.sectors[0];
        assert_eq!(first.sector_number, 1);
        assert!(first.port.as_ref().unwrap().port_type.is_stardock());
        assert_eq!(first.port_class, 9);
        assert_eq!(first.port_name.as_deref(), Some("Stardock"));
    }

    #[test]
    fn test_every_sector_reachable() {
        let plan = generate(100, 77, &GameRules::default());
        let mut seen = HashSet::from([1u32]);
        let mut queue = VecDeque::from([1u32]);
        while let Some(s) = queue.pop_front() {
            for n in neighbors(&plan.warps, s) {
                if seen.insert(n) {
                    queue.push_back(n);
                }
            }
        }
        assert_eq!(seen.len(), 100);
    }

    #[test]
    fn test_port_stock_within_regen_bounds() {
        let rules = GameRules::default();
        for s in generate(200, 5, &rules).sectors {
            if let Some(p) = s.port.filter(|p| !p.port_type.is_stardock()) {
                assert!(p
                    .stock
                    .iter()
                    .all(|q| (rules.port_regen_min..=rules.port_regen_max).contains(q)));
                assert!((1..=8).contains(&s.port_class));
            }
        }
    }

    #[test]
    fn test_no_self_warps() {
        assert!(generate(60, 3, &GameRules::default())
            .warps
            .iter()
            .all(|w| w.from != w.to));
    }
}
