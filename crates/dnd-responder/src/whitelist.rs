//! `whitelist` subcommands.

use std::io::Write;
use std::path::Path;

use responder_models::PhoneNumber;
use responder_persistence::WhitelistStore;

use crate::cli::WhitelistCommands;

/// Runs a whitelist subcommand against the file at `path`.
pub fn run(
    command: &WhitelistCommands,
    path: &Path,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        WhitelistCommands::Init => {
            WhitelistStore::init(path)?;
            writeln!(out, "Created {}", path.display())?;
        }
        WhitelistCommands::List => {
            let store = WhitelistStore::load(path)?;
            print_entries(&store, out)?;
        }
        WhitelistCommands::Add { phone_number, name } => {
            let store = WhitelistStore::load(path)?;
            let number = PhoneNumber::parse(phone_number)?;
            if store.add(number.as_str(), name.as_deref())? {
                writeln!(out, "Added {}", number)?;
            } else {
                writeln!(out, "{} is already whitelisted", number)?;
            }
        }
        WhitelistCommands::Remove { phone_number } => {
            let store = WhitelistStore::load(path)?;
            let number = PhoneNumber::parse(phone_number)?;
            if store.remove(number.as_str())? {
                writeln!(out, "Removed {}", number)?;
            } else {
                writeln!(out, "{} was not whitelisted", number)?;
            }
        }
    }
    Ok(())
}

fn print_entries(store: &WhitelistStore, out: &mut impl Write) -> std::io::Result<()> {
    if store.is_empty() {
        return writeln!(out, "Whitelist is empty ({})", store.path().display());
    }

    writeln!(out, "{} whitelisted contact(s):", store.len())?;
    for entry in store.list() {
        match &entry.display_name {
            Some(name) => writeln!(out, "  {}  {}", entry.phone_number, name)?,
            None => writeln!(out, "  {}", entry.phone_number)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn run_to_string(command: WhitelistCommands, path: &Path) -> String {
        let mut out = Vec::new();
        run(&command, path, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_init_add_list_remove() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("whitelist.json");

        assert!(run_to_string(WhitelistCommands::Init, &path).starts_with("Created"));

        let output = run_to_string(
            WhitelistCommands::Add {
                phone_number: "+1 (555) 765-4321".into(),
                name: Some("Jo".into()),
            },
            &path,
        );
        assert_eq!(output, "Added +15557654321\n");

        let output = run_to_string(WhitelistCommands::List, &path);
        assert!(output.contains("+15557654321  Jo"));

        let output = run_to_string(
            WhitelistCommands::Remove {
                phone_number: "+15557654321".into(),
            },
            &path,
        );
        assert_eq!(output, "Removed +15557654321\n");

        let output = run_to_string(WhitelistCommands::List, &path);
        assert!(output.starts_with("Whitelist is empty"));
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("whitelist.json");
        run_to_string(WhitelistCommands::Init, &path);

        let mut out = Vec::new();
        assert!(run(&WhitelistCommands::Init, &path, &mut out).is_err());
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        let mut out = Vec::new();
        let result = run(&WhitelistCommands::List, &dir.path().join("nope.json"), &mut out);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_number_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("whitelist.json");
        run_to_string(WhitelistCommands::Init, &path);

        let mut out = Vec::new();
        let command = WhitelistCommands::Add {
            phone_number: "call me".into(),
            name: None,
        };
        assert!(run(&command, &path, &mut out).is_err());
    }
}
