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
use std::path::PathBuf;

use clap::Parser;

use crate::config::{OnFetchError, RewriteSpec, Settings, SettingsOverlay};
use crate::dedup::DedupKey;

#[derive(Parser, Debug)]
#[clap(name = "m3umerge", author, version, about, long_about=None)] // Read from `Cargo.toml`
pub struct Args {
    /// Playlist urls or local files, in the order they should be merged.
    /// Replaces the sources of the config file.
    #[arg(value_name = "SOURCE")]
    pub sources: Vec<String>,
    /// Config file, default is `~/.config/m3umerge/config.toml` if it exists.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Where to write the merged playlist.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
    /// Local playlist read after all sources, skipped if it does not exist.
    #[arg(short, long, value_name = "FILE")]
    pub local_file: Option<PathBuf>,
    /// Keep channels whose name contains NAME (ignoring case). Repeatable.
    #[arg(short, long, value_name = "NAME")]
    pub include: Vec<String>,
    /// Drop channels whose name contains NAME (ignoring case), even if included. Repeatable.
    #[arg(short = 'x', long, value_name = "NAME")]
    pub exclude: Vec<String>,
    /// Keep only channels with `group-title="LABEL"`. Repeatable.
    #[arg(short, long, value_name = "LABEL")]
    pub group: Vec<String>,
    /// Field deciding whether two channels are duplicates.
    #[arg(long, value_enum)]
    pub dedup_key: Option<DedupKey>,
    /// What to do if a source cannot be fetched.
    #[arg(long, value_enum)]
    pub on_fetch_error: Option<OnFetchError>,
    /// Set a attribute on every kept channel, like `group-title=General`.
    #[arg(long, value_name = "ATTR=VALUE")]
    pub rewrite: Option<RewriteSpec>,
    /// Print the effective settings as toml and exit.
    #[arg(long)]
    pub print_config: bool,
}

impl Args {
    /// Layer the CLI values on top of the loaded settings
    pub fn overlay(&self, settings: Settings) -> SettingsOverlay {
        SettingsOverlay {
            settings,
            sources: self.sources.clone(),
            include: self.include.clone(),
            exclude: self.exclude.clone(),
            groups: self.group.clone(),
            output: self.output.clone(),
            local_file: self.local_file.clone(),
            dedup_key: self.dedup_key,
            on_fetch_error: self.on_fetch_error,
            rewrite: self.rewrite.clone(),
        }
    }
}
