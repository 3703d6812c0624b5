use crate::{instructions::properties, Revision};
use once_cell::race::OnceBox;

/// Per-revision metadata of one opcode, consumed by the code analyzer.
#[derive(Clone, Copy, Debug)]
pub struct InstructionTableEntry {
    pub gas_cost: u16,
    pub stack_height_required: u8,
    pub stack_height_change: i8,
}

pub type InstructionTable = [Option<InstructionTableEntry>; 256];
pub type InstructionTables = [InstructionTable; Revision::len()];

pub static INSTRUCTION_TABLES: OnceBox<InstructionTables> = OnceBox::new();

pub fn get_instruction_table(revision: Revision) -> &'static InstructionTable {
    &INSTRUCTION_TABLES.get_or_init(|| {
        let mut tables = Box::new([[None; 256]; Revision::len()]);

        for revision in Revision::iter() {
            let table = &mut tables[revision as usize];
            for (opcode, &cost) in properties::gas_costs(revision).iter().enumerate() {
                if let Some(cost) = cost {
                    let properties = properties::PROPERTIES[opcode].unwrap();

                    // Any instruction can grow the stack by at most one item,
                    // which keeps the per-block growth tracking exact.
                    assert!(properties.stack_height_change <= 1);

                    table[opcode] = Some(InstructionTableEntry {
                        gas_cost: cost,
                        stack_height_required: properties.stack_height_required,
                        stack_height_change: properties.stack_height_change,
                    });
                }
            }
        }
        tables
    })[revision as usize]
}
