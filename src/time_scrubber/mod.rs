pub mod time_scrubber;

pub use time_scrubber::TimeScrubber;
