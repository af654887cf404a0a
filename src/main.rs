#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::correctness)]
#![warn(rust_2018_idioms)]
#![warn(clippy::pedantic)]
/**
 * MIT License
 *
 * m3umerge - Copyright (c) 2024 m3umerge contributors
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */
use std::process;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use m3umergelib::cli::Args;
use m3umergelib::config::Settings;
use m3umergelib::fetch::Fetcher;
use m3umergelib::pipeline;
#[macro_use]
extern crate log;

/// Exit code if there is nothing to merge
const EXIT_NO_SOURCES: i32 = 2;

fn main() -> Result<()> {
    lovely_env_logger::init_default();

    let args = Args::parse();
    let settings = get_config(&args)?;

    if args.print_config {
        print!("{}", settings.to_toml()?);
        return Ok(());
    }

    if settings.has_no_sources() {
        eprintln!("Error: no playlist sources given, pass at least one url or configure `sources`");
        process::exit(EXIT_NO_SOURCES);
    }

    let fetcher = Fetcher::new(Duration::from_secs(settings.fetch_timeout_secs));
    let report = pipeline::run(&settings, &fetcher)?;

    debug!("{report:?}");
    if report.sources_skipped > 0 {
        println!(
            "Skipped {} of {} sources that could not be fetched",
            report.sources_skipped,
            report.sources_skipped + report.sources_read
        );
    }
    println!(
        "Saved {} unique matched entries into: {}",
        report.written,
        settings.output.display()
    );

    Ok(())
}

fn get_config(args: &Args) -> Result<Settings> {
    let settings = Settings::load(args.config.as_deref())?;

    Ok(args.overlay(settings).into_settings())
}
