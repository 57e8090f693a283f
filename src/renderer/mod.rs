pub mod renderer;

pub use renderer::{
    render_json, render_tab, tab_info, TabLayout, DEFAULT_COLUMN_WIDTH, DEFAULT_EVENTS_PER_LINE,
};
