//! comment-sentiment - YouTube comment sentiment analysis CLI
//!
//! Fetches the comments of a video, cleans them, and labels each one with a
//! trained statistical classifier and a pretrained neural model.
//!
//! ## Quick Start
//!
//! ```bash
//! # Train the statistical classifier from a labeled CSV (text,label)
//! comment-sentiment train --csv data/labeled.csv
//!
//! # Analyze a video (needs YOUTUBE_API_KEY and HF_TOKEN)
//! comment-sentiment analyze --video-id dQw4w9WgXcQ
//!
//! # Summarize the latest run
//! comment-sentiment report
//! ```

mod commands;

fn main() {
    if let Err(err) = commands::run() {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
