//! Plant fixtures in the text mini-language

use dcsynth_core::{Automaton, TextFormat, UStructure};

/// Two controllers, seven plant states.
///
/// Controller 1 sees and controls `a`, controller 2 sees and controls `b`;
/// both see `o`, only controller 1 controls it. `o` is illegal after `b a`
/// but legal after `a b`.
pub const TWO_CONTROLLER_PLANT: &str = "\
[controllers]
2
[states]
@1,F
2,F
3,F
4,F
5,F
6,F
7,F
[events]
a,TF,TF
b,FT,FT
o,TT,TF
[transitions]
1,a,2
1,b,3
2,b,4
3,a,5
4,o,6
5,o,7:BAD
";

/// Controller 2 controls `c` but cannot see `u`, so it cannot block `c` after `u`
pub const HIDDEN_BAD_PLANT: &str = "\
[controllers]
2
[states]
@1,F
2,F
3,F
4,F
[events]
u,TF,FF
c,TT,FT
[transitions]
1,u,2
1,c,3
2,c,4:BAD
";

pub fn two_controller_plant() -> Automaton {
    TextFormat::parse_document(TWO_CONTROLLER_PLANT).unwrap()
}

pub fn hidden_bad_plant() -> Automaton {
    TextFormat::parse_document(HIDDEN_BAD_PLANT).unwrap()
}

/// U-Structure of the two-controller plant with communications added
pub fn two_controller_ustructure() -> UStructure {
    two_controller_plant()
        .synchronized_composition()
        .unwrap()
        .add_communications()
        .unwrap()
}

/// Chain `1 -e1-> 2 -e2-> ... -> n+1`, every event seen and controlled by
/// every controller
pub fn chain_plant(n_controllers: usize, length: usize) -> Automaton {
    let flags = "T".repeat(n_controllers);
    let mut doc = format!("[controllers]\n{}\n[states]\n@1,F\n", n_controllers);
    for i in 2..=length + 1 {
        doc.push_str(&format!("{},F\n", i));
    }
    doc.push_str("[events]\n");
    for i in 1..=length {
        doc.push_str(&format!("e{},{},{}\n", i, flags, flags));
    }
    doc.push_str("[transitions]\n");
    for i in 1..=length {
        doc.push_str(&format!("{},e{},{}\n", i, i, i + 1));
    }
    TextFormat::parse_document(&doc).unwrap()
}
