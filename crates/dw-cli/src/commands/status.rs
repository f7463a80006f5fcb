//! Status command: tracked options and accumulated domain time.

use std::io::Write;

use anyhow::Result;

use dw_store::Store;

pub fn run<W: Write>(writer: &mut W, store: &Store) -> Result<()> {
    let options = store.get_options()?;
    let ledger = store.load_domain_times()?;

    writeln!(
        writer,
        "Tracking: {}",
        if options.tracking_enabled {
            "enabled"
        } else {
            "disabled"
        }
    )?;
    writeln!(
        writer,
        "Watching: {} (warn after {} min)",
        options.domain, options.threshold_minutes
    )?;

    if ledger.is_empty() {
        writeln!(writer, "No time recorded.")?;
        return Ok(());
    }

    writeln!(writer, "Recorded time:")?;
    for (domain, minutes) in &ledger {
        writeln!(writer, "- {domain}: {minutes} min")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use dw_core::options::OptionsPatch;
    use dw_core::session::DomainLedger;
    use insta::assert_snapshot;

    #[test]
    fn status_renders_options_and_ledger() {
        let mut store = Store::open_in_memory().unwrap();
        store
            .set_options(&OptionsPatch {
                domain: Some("example.com".to_string()),
                threshold_minutes: Some(1.5),
                ..OptionsPatch::default()
            })
            .unwrap();
        store
            .save_domain_times(&DomainLedger::from([
                ("example.com".to_string(), 12),
                ("other.com".to_string(), 0),
            ]))
            .unwrap();

        let mut output = Vec::new();
        run(&mut output, &store).unwrap();

        assert_snapshot!(String::from_utf8(output).unwrap(), @r"
        Tracking: enabled
        Watching: example.com (warn after 1.5 min)
        Recorded time:
        - example.com: 12 min
        - other.com: 0 min
        ");
    }

    #[test]
    fn status_with_empty_store_uses_defaults() {
        let store = Store::open_in_memory().unwrap();

        let mut output = Vec::new();
        run(&mut output, &store).unwrap();

        assert_snapshot!(String::from_utf8(output).unwrap(), @r"
        Tracking: enabled
        Watching: twitter.com (warn after 15 min)
        No time recorded.
        ");
    }
}
