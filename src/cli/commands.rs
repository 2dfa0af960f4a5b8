use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::domain::{SearchSort, TrendingPeriod};

#[derive(Parser)]
#[command(name = "starfield")]
#[command(about = "NYT article feeds laid out as a starfield of colored, orbiting stars")]
#[command(version)]
pub struct Cli {
    /// Give sections without a table color a hashed palette color instead of grey
    #[arg(long, global = true)]
    pub hash_colors: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the latest articles from the newswire stream
    Latest {
        /// Section to narrow the stream to ("all" for every section)
        #[arg(short, long, default_value = "all")]
        section: String,
    },

    /// Show the most viewed articles
    Trending {
        /// Trailing period in days: 1, 7 or 30
        #[arg(short, long, default_value = "1")]
        period: TrendingPeriod,
    },

    /// Search the article archive
    Search {
        /// Free-text query
        query: String,

        /// Result order: newest, oldest or relevance
        #[arg(long, default_value = "newest")]
        sort: SearchSort,

        /// Only articles published on or after this date (YYYY-MM-DD)
        #[arg(long)]
        begin_date: Option<NaiveDate>,

        /// Only articles published on or before this date (YYYY-MM-DD)
        #[arg(long)]
        end_date: Option<NaiveDate>,

        /// Zero-based result page
        #[arg(long, default_value_t = 0)]
        page: u32,
    },

    /// Keep polling the latest articles and report new arrivals until Ctrl-C
    Watch {
        /// Section to narrow the stream to ("all" for every section)
        #[arg(short, long, default_value = "all")]
        section: String,
    },

    /// Check that the configured API key is accepted
    CheckKey,
}
