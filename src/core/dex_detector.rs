use std::collections::BTreeSet;

use crate::core::instruction_extractor::ExtractedInstruction;
use crate::core::program_registry::ProgramRegistry;
use crate::types::DexMatch;

/// Reports which registered exchange programs took part in a transaction.
/// An empty result only means no known exchange was seen.
pub struct DexDetector<'a> {
    registry: &'a ProgramRegistry,
}

impl<'a> DexDetector<'a> {
    pub fn new(registry: &'a ProgramRegistry) -> Self {
        Self { registry }
    }

    /// Direct and index-resolved ids are checked independently, so one
    /// instruction can yield two matches.
    pub fn detect(&self, instructions: &[ExtractedInstruction]) -> Vec<DexMatch> {
        let mut matches = Vec::new();
        for instruction in instructions {
            let candidates = [
                (instruction.program_id.as_deref(), false),
                (instruction.resolved_program_id.as_deref(), true),
            ];
            for (program_id, via_index) in candidates {
                let Some(program_id) = program_id else {
                    continue;
                };
                if !self.registry.contains(program_id) {
                    continue;
                }
                tracing::debug!(
                    program_id,
                    via_index,
                    position = %instruction.position(),
                    "dex program detected"
                );
                matches.push(DexMatch {
                    program_id: program_id.to_string(),
                    exchanges: self.registry.exchanges_for(program_id).to_vec(),
                    outer_index: instruction.outer_index,
                    inner_index: instruction.inner_index,
                    via_index,
                });
            }
        }
        matches
    }

    /// Set view of [`detect`](Self::detect).
    pub fn program_ids(&self, instructions: &[ExtractedInstruction]) -> BTreeSet<String> {
        self.detect(instructions)
            .into_iter()
            .map(|found| found.program_id)
            .collect()
    }
}
