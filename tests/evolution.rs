// tests/evolution.rs
use bevy_prng::WyRand;
use rand_core::SeedableRng;
use std::cell::RefCell;
use std::collections::HashSet;

use times_tables::systems::catalog::{ChainLink, ChainShape, EvolutionStage, StageRef};
use times_tables::systems::sdk::{ChainSource, CharacterSource, Offline, SourceError};
use times_tables::{Catalog, Character, EvolutionRecord, NextEvolution};

fn rng(seed: u64) -> RefCell<WyRand> {
    RefCell::new(WyRand::from_seed(seed.to_le_bytes()))
}

/// Evolve `id` once against `history`, appending the record.
fn step(catalog: &Catalog, id: u32, history: &mut Vec<EvolutionRecord>, r: &RefCell<WyRand>) -> bool {
    let record = match catalog.next_evolution(id, history, r) {
        NextEvolution::Ready { from, to } => EvolutionRecord::new(id, from, to, 5),
        _ => return false,
    };
    history.push(record);
    true
}

fn record(id: u32, from: &str, to: &str) -> EvolutionRecord {
    EvolutionRecord {
        character_id: id,
        from: StageRef { name: from.into(), image_url: String::new() },
        to: StageRef { name: to.into(), image_url: String::new() },
        table_completed: 2,
    }
}

/* ──────────────────────────────────────────────────────────────────────────
1) Built-in data
────────────────────────────────────────────────────────────────────────── */

#[test]
fn builtin_starters_and_shapes() {
    let catalog = Catalog::builtin();
    let ids: Vec<u32> = catalog.starters().iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![1, 4, 7, 25, 133]);

    assert_eq!(catalog.chain(1).map(|c| c.len()), Some(3));
    assert_eq!(catalog.chain(25).map(|c| c.len()), Some(2));
    assert_eq!(catalog.chain(133).map(|c| c.shape), Some(ChainShape::Branching));
    assert_eq!(catalog.chain(4).map(|c| c.shape), Some(ChainShape::Linear));
    assert_eq!(catalog.character(7).map(|c| c.name.as_str()), Some("Squirtle"));
}

/* ──────────────────────────────────────────────────────────────────────────
2) Stage lookup from history
────────────────────────────────────────────────────────────────────────── */

#[test]
fn no_history_means_base_stage() {
    let catalog = Catalog::builtin();
    let info = catalog.stage_info(4, &[]);
    assert_eq!(info.current.map(|s| s.name.as_str()), Some("Charmander"));
    assert_eq!(info.next.map(|s| s.name.as_str()), Some("Charmeleon"));
    assert_eq!((info.stage, info.max_stage, info.remaining), (1, 3, 2));
}

#[test]
fn latest_record_wins_and_unknown_names_fall_back_to_base() {
    let catalog = Catalog::builtin();
    let history = vec![
        record(4, "Charmander", "Charmeleon"),
        record(7, "Squirtle", "Wartortle"),
        record(4, "Charmeleon", "Charizard"),
    ];
    assert_eq!(catalog.current_index(4, &history), 2);
    assert_eq!(catalog.current_index(7, &history), 1);
    assert_eq!(catalog.current_index(1, &history), 0);

    let broken = vec![record(4, "Charmander", "Missingno")];
    assert_eq!(catalog.current_index(4, &broken), 0);
}

#[test]
fn unknown_character_has_no_stage() {
    let catalog = Catalog::builtin();
    let info = catalog.stage_info(999, &[]);
    assert!(info.current.is_none());
    assert_eq!((info.stage, info.max_stage, info.remaining), (1, 0, 0));
}

/* ──────────────────────────────────────────────────────────────────────────
3) Linear chains — one step at a time, never past the end
────────────────────────────────────────────────────────────────────────── */

#[test]
fn linear_chain_advances_by_one_until_max() {
    let catalog = Catalog::builtin();
    let r = rng(1);
    let mut history = Vec::new();
    let len = catalog.chain(1).map(|c| c.len()).unwrap_or(0);

    let mut last = catalog.current_index(1, &history);
    while step(&catalog, 1, &mut history, &r) {
        let idx = catalog.current_index(1, &history);
        assert_eq!(idx, last + 1, "stage must advance by exactly one");
        assert!(idx < len);
        last = idx;
    }
    assert_eq!(last, len - 1);
    assert_eq!(catalog.next_evolution(1, &history, &r), NextEvolution::MaxReached);
    let names: Vec<_> = history.iter().map(|h| h.to.name.as_str()).collect();
    assert_eq!(names, vec!["Ivysaur", "Venusaur"]);
}

#[test]
fn missing_or_single_stage_chain_is_unavailable() {
    let mut catalog = Catalog::builtin();
    let r = rng(2);
    assert_eq!(catalog.next_evolution(42, &[], &r), NextEvolution::Unavailable);

    catalog.insert_chain(42, vec![EvolutionStage::new(42, "Solo")]);
    assert_eq!(catalog.next_evolution(42, &[], &r), NextEvolution::Unavailable);
    assert!(!catalog.next_evolution(42, &[], &r).is_ready());
}

/* ──────────────────────────────────────────────────────────────────────────
4) Branching character — uniform among unobtained finals, then exhaustion
────────────────────────────────────────────────────────────────────────── */

#[test]
fn branching_targets_are_unobtained_finals() {
    let catalog = Catalog::builtin();
    let history = vec![record(133, "Eevee", "Vaporeon")];
    let mut seen = HashSet::new();
    for seed in 0..200 {
        match catalog.next_evolution(133, &history, &rng(seed)) {
            NextEvolution::Ready { from, to } => {
                assert_eq!(from.name, "Eevee");
                seen.insert(to.name.clone());
            }
            other => panic!("expected a target, got {:?}", other),
        }
    }
    let expected: HashSet<String> = ["Jolteon", "Flareon"].iter().map(|s| s.to_string()).collect();
    assert_eq!(seen, expected);
}

#[test]
fn branching_exhausts_after_every_final() {
    let catalog = Catalog::builtin();
    let r = rng(9);
    let mut history = Vec::new();
    let mut steps = 0;
    while step(&catalog, 133, &mut history, &r) {
        steps += 1;
        assert!(steps <= 3, "more evolutions than finals");
    }
    assert_eq!(steps, 3);

    let finals: HashSet<_> = history.iter().map(|h| h.to.name.clone()).collect();
    assert_eq!(finals.len(), 3, "a final was drawn twice: {:?}", history);
    assert_eq!(catalog.next_evolution(133, &history, &r), NextEvolution::MaxReached);
    assert_eq!(catalog.stage_info(133, &history).remaining, 0);
}

#[test]
fn branching_designation_can_move() {
    let catalog = Catalog::builtin().with_branching_character(1);
    assert_eq!(catalog.chain(1).map(|c| c.shape), Some(ChainShape::Branching));
    assert_eq!(catalog.chain(133).map(|c| c.shape), Some(ChainShape::Linear));
}

/* ──────────────────────────────────────────────────────────────────────────
5) Remote data — resolution and fallback
────────────────────────────────────────────────────────────────────────── */

fn link(id: u32, name: &str, next: Vec<ChainLink>) -> ChainLink {
    ChainLink { species: EvolutionStage::new(id, name), evolves_to: next }
}

struct Chains;
impl ChainSource for Chains {
    fn fetch_chain(&self, reference: &str) -> Result<ChainLink, SourceError> {
        match reference {
            "chain/1" => Ok(link(1, "bulbasaur", vec![link(2, "ivysaur", vec![link(3, "venusaur", vec![])])])),
            "chain/133" => Ok(link(
                133,
                "eevee",
                vec![
                    link(134, "vaporeon", vec![]),
                    link(135, "jolteon", vec![]),
                    link(196, "espeon", vec![]),
                ],
            )),
            "chain/solo" => Ok(link(25, "pikachu", vec![])),
            other => Err(SourceError::NotFound(other.to_string())),
        }
    }
}

fn with_ref(id: u32, reference: &str) -> Character {
    Character {
        id,
        name: String::new(),
        image_url: String::new(),
        evolution_chain_ref: Some(reference.to_string()),
    }
}

#[test]
fn linear_tree_follows_first_branch_and_capitalizes() {
    let tree = link(1, "a", vec![link(2, "b", vec![link(3, "c", vec![])]), link(9, "z", vec![])]);
    let names: Vec<_> = tree.flatten_linear().into_iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["A", "B", "C"]);
}

#[test]
fn resolve_chain_installs_remote_chains() {
    let mut catalog = Catalog::builtin();
    assert!(catalog.resolve_chain(&with_ref(1, "chain/1"), &Chains));
    assert_eq!(
        catalog.chain(1).map(|c| c.stages().iter().map(|s| s.name.clone()).collect::<Vec<_>>()),
        Some(vec!["Bulbasaur".to_string(), "Ivysaur".into(), "Venusaur".into()])
    );

    assert!(catalog.resolve_chain(&with_ref(133, "chain/133"), &Chains));
    let eevee = catalog.chain(133).map(|c| c.stages().to_vec()).unwrap_or_default();
    assert_eq!(eevee.len(), 4);
    assert_eq!(eevee[3].name, "Espeon");
    assert_eq!(catalog.chain(133).map(|c| c.shape), Some(ChainShape::Branching));
}

#[test]
fn resolve_chain_keeps_builtin_on_failure() {
    let mut catalog = Catalog::builtin();
    let before = catalog.chain(25).cloned();

    assert!(!catalog.resolve_chain(&with_ref(25, "chain/solo"), &Chains));
    assert!(!catalog.resolve_chain(&with_ref(25, "chain/missing"), &Chains));
    assert!(!catalog.resolve_chain(&with_ref(25, "chain/25"), &Offline));
    assert!(!catalog.resolve_chain(&Character { evolution_chain_ref: None, ..with_ref(25, "") }, &Chains));
    assert_eq!(catalog.chain(25).cloned(), before);
}

struct Roster(Vec<Character>);
impl CharacterSource for Roster {
    fn fetch_characters(&self) -> Result<Vec<Character>, SourceError> {
        Ok(self.0.clone())
    }
}

#[test]
fn character_list_falls_back_to_starters() {
    let catalog = Catalog::builtin();
    let offline = catalog.load_characters(&Offline);
    assert_eq!(offline, catalog.starters().to_vec());

    let empty = catalog.load_characters(&Roster(Vec::new()));
    assert_eq!(empty.len(), 5);

    let remote = catalog.load_characters(&Roster(vec![Character {
        id: 152,
        name: "chikorita".into(),
        image_url: "u".into(),
        evolution_chain_ref: None,
    }]));
    assert_eq!(remote.len(), 1);
    assert_eq!(remote[0].name, "Chikorita");
}
