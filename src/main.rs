// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scrollnav-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scrollnav and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Scrollnav CLI entrypoint.
//!
//! Loads a page (a JSON fixture or one of the built-in demo chats), starts a navigator on it
//! and runs the terminal host. `--dump` prints the outline instead.

use std::env;
use std::error::Error;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::sync::Mutex;

use scrollnav::adapter::SiteAdapter;
use scrollnav::config::NavigatorConfig;
use scrollnav::dom::PageFixture;
use scrollnav::index::EntryKind;
use scrollnav::navigator::Navigator;
use scrollnav::store::{FilePositionStore, MemoryPositionStore, PositionStore};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "SCROLLNAV_LOG";
const LOG_FILE_ENV: &str = "SCROLLNAV_LOG_FILE";

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [--demo <claude|chatgpt|gemini>] [--store <file>] [--config <file>] [--dump]\n  {program} --page <fixture.json> [--store <file>] [--config <file>] [--dump]\n\nWithout --page the built-in demo chat is loaded (claude unless --demo says otherwise).\n--store keeps the dragged panel position in a JSON file; by default it lives in memory.\n--dump prints the outline (id, kind, text) and exits without starting the terminal UI.\n\nLogging: {LOG_ENV}=<filter> enables tracing output, written to {LOG_FILE_ENV} if set."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    page: Option<String>,
    demo: Option<SiteAdapter>,
    store: Option<String>,
    config: Option<String>,
    dump: bool,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--page" => set_once(&mut options.page, args.next())?,
            "--store" => set_once(&mut options.store, args.next())?,
            "--config" => set_once(&mut options.config, args.next())?,
            "--demo" => {
                if options.demo.is_some() {
                    return Err(());
                }
                let raw = args.next().ok_or(())?;
                options.demo = Some(raw.parse().map_err(|_| ())?);
            }
            "--dump" => {
                if options.dump {
                    return Err(());
                }
                options.dump = true;
            }
            _ => return Err(()),
        }
    }

    if options.page.is_some() && options.demo.is_some() {
        return Err(());
    }

    Ok(options)
}

fn set_once(slot: &mut Option<String>, value: Option<String>) -> Result<(), ()> {
    if slot.is_some() {
        return Err(());
    }
    *slot = Some(value.ok_or(())?);
    Ok(())
}

fn init_logging() -> Result<(), Box<dyn Error>> {
    let filter = match env::var(LOG_ENV) {
        Ok(value) if !value.trim().is_empty() => EnvFilter::try_new(value.trim())?,
        _ => return Ok(()),
    };
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_ansi(false);
    // The terminal UI owns stdout, so logs go to a file or nowhere.
    let installed = match env::var_os(LOG_FILE_ENV) {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder.with_writer(Mutex::new(file)).try_init()
        }
        None => builder.with_writer(io::sink).try_init(),
    };
    installed.map_err(|err| -> Box<dyn Error> { err })
}

fn print_outline(navigator: &Navigator) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for entry in navigator.index().entries() {
        let kind = match entry.kind() {
            EntryKind::Turn { role } => role.as_str().to_owned(),
            EntryKind::Heading { level } => format!("h{level}"),
        };
        writeln!(out, "{}\t{}\t{}", entry.id(), kind, entry.display().text())?;
    }
    out.flush()
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = env::args();
        let program = args.next().unwrap_or_else(|| "scrollnav".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        init_logging()?;

        let config = match &options.config {
            Some(path) => NavigatorConfig::load(path)?,
            None => NavigatorConfig::default(),
        };
        let fixture = match &options.page {
            Some(path) => PageFixture::load(path)?,
            None => options.demo.unwrap_or(SiteAdapter::Claude).demo_page(),
        };
        let mut doc = fixture.build()?;
        let store: Box<dyn PositionStore> = match options.store {
            Some(path) => Box::new(FilePositionStore::new(path)),
            None => Box::new(MemoryPositionStore::default()),
        };
        let navigator = Navigator::start(&mut doc, config, store, 0)?;

        if options.dump {
            print_outline(&navigator)?;
            return Ok(());
        }
        scrollnav::tui::run(doc, navigator)
    })();

    if let Err(err) = result {
        eprintln!("scrollnav: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{init_logging, parse_options, CliOptions, LOG_ENV, LOG_FILE_ENV};
    use scrollnav::adapter::SiteAdapter;

    fn args(raw: &[&str]) -> impl Iterator<Item = String> {
        raw.iter().map(|arg| (*arg).to_owned()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn parses_empty_args() {
        let options = parse_options(std::iter::empty()).expect("parse options");
        assert_eq!(options, CliOptions::default());
    }

    #[test]
    fn parses_demo_site() {
        let options = parse_options(args(&["--demo", "gemini", "--dump"])).expect("parse options");
        assert_eq!(options.demo, Some(SiteAdapter::Gemini));
        assert!(options.dump);
        assert!(options.page.is_none());
    }

    #[test]
    fn parses_page_store_and_config() {
        let options = parse_options(args(&["--page", "chat.json", "--store", "pos.json", "--config", "nav.json"]))
            .expect("parse options");
        assert_eq!(options.page.as_deref(), Some("chat.json"));
        assert_eq!(options.store.as_deref(), Some("pos.json"));
        assert_eq!(options.config.as_deref(), Some("nav.json"));
        assert!(!options.dump);
    }

    #[test]
    fn logging_installs_once_from_the_env_filter() {
        std::env::remove_var(LOG_FILE_ENV);
        std::env::remove_var(LOG_ENV);
        init_logging().expect("no subscriber without a filter");

        std::env::set_var(LOG_ENV, "scrollnav=debug");
        init_logging().expect("first subscriber installs");
        assert!(init_logging().is_err());
        std::env::remove_var(LOG_ENV);
    }

    #[test]
    fn rejects_unknown_demo_site() {
        parse_options(args(&["--demo", "bing"])).unwrap_err();
    }

    #[test]
    fn rejects_page_with_demo() {
        parse_options(args(&["--page", "chat.json", "--demo", "claude"])).unwrap_err();
    }

    #[test]
    fn rejects_missing_values() {
        parse_options(args(&["--page"])).unwrap_err();
        parse_options(args(&["--demo"])).unwrap_err();
        parse_options(args(&["--store"])).unwrap_err();
    }

    #[test]
    fn rejects_unknown_and_duplicate_args() {
        parse_options(args(&["--nope"])).unwrap_err();
        parse_options(args(&["positional"])).unwrap_err();
        parse_options(args(&["--dump", "--dump"])).unwrap_err();
        parse_options(args(&["--store", "a", "--store", "b"])).unwrap_err();
    }
}
