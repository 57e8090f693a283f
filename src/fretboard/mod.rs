pub mod candidates;
pub mod mapper;
pub mod optimizer;


pub use candidates::{candidate_sets, candidates};
pub use mapper::{map_sequence, SequenceMapper};
pub use optimizer::{
    assignment_cost, optimize_chord, optimize_event, optimize_single, Selection, BEAM_WIDTH,
    MAX_CHORD_SPAN,
};
