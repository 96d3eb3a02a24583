//! Interactive serial port selection

use std::io::{BufRead, Write};

use crate::ports::EnumeratePorts;
use crate::select::{parse_index, print_numbered, read_line};
use crate::Error;

/// Separator between a device name and its description in a port label.
const LABEL_SEPARATOR: &str = " - ";

/// Returns the device part of a port label, dropping any ` - <description>` suffix.
pub fn extract_port_id(label: &str) -> &str {
    match label.find(LABEL_SEPARATOR) {
        Some(pos) => label[..pos].trim(),
        None => label.trim(),
    }
}

/// Asks the user to pick a serial port, re-enumerating `ports` on every round.
///
/// The list is only reprinted when it differs from the one last shown. Entering `q` cancels and
/// returns `None`, an empty line or `r` refreshes.
pub fn choose_port<P, R, W>(
    ports: &P,
    input: &mut R,
    output: &mut W,
) -> Result<Option<String>, Error>
where
    P: EnumeratePorts + ?Sized,
    R: BufRead,
    W: Write,
{
    let mut shown: Option<Vec<String>> = None;

    loop {
        let current = ports.enumerate();

        if current.is_empty() {
            writeln!(
                output,
                "No ports found. Connect the device and press Enter to refresh."
            )?;
            output.flush()?;
            read_line(input)?;
            continue;
        }

        if shown.as_ref() != Some(&current) {
            writeln!(output, "Available ports:")?;
            print_numbered(&current, output)?;
            shown = Some(current.clone());
        }

        loop {
            write!(output, "Choose a port [number], Enter=refresh, q=quit: ")?;
            output.flush()?;

            let choice = read_line(input)?.to_lowercase();

            match choice.as_str() {
                "q" => return Ok(None),
                "" | "r" => break,
                _ => {}
            }

            if let Some(index) = parse_index(&choice, current.len()) {
                return Ok(Some(extract_port_id(&current[index]).to_string()));
            }

            writeln!(output, "Invalid choice.")?;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::io::Cursor;

    use super::*;

    /// Replays a fixed sequence of snapshots, repeating the last one once exhausted.
    struct Snapshots {
        remaining: RefCell<VecDeque<Vec<String>>>,
        calls: RefCell<usize>,
    }

    impl Snapshots {
        fn new(snapshots: &[&[&str]]) -> Snapshots {
            Snapshots {
                remaining: RefCell::new(
                    snapshots
                        .iter()
                        .map(|ports| ports.iter().map(|p| p.to_string()).collect())
                        .collect(),
                ),
                calls: RefCell::new(0),
            }
        }
    }

    impl EnumeratePorts for Snapshots {
        fn enumerate(&self) -> Vec<String> {
            *self.calls.borrow_mut() += 1;

            let mut remaining = self.remaining.borrow_mut();

            if remaining.len() > 1 {
                remaining.pop_front().unwrap_or_default()
            } else {
                remaining.front().cloned().unwrap_or_default()
            }
        }
    }

    fn run(ports: &Snapshots, input: &str) -> (Result<Option<String>, Error>, String) {
        let mut output = Vec::new();
        let result = choose_port(ports, &mut Cursor::new(input), &mut output);

        (result, String::from_utf8(output).unwrap())
    }

    #[test]
    fn it_should_extract_the_port_id() {
        assert_eq!(extract_port_id("COM4 - USB Serial Device"), "COM4");
        assert_eq!(
            extract_port_id("/dev/ttyUSB0 - CP2102 - rev 2"),
            "/dev/ttyUSB0"
        );
        assert_eq!(extract_port_id(" COM7 "), "COM7");
    }

    #[test]
    fn it_should_return_the_chosen_port() {
        let ports = Snapshots::new(&[&["COM3", "COM5"]]);
        let (result, output) = run(&ports, "2\n");

        assert_eq!(result.unwrap(), Some("COM5".to_string()));
        assert!(output.starts_with("Available ports:\n1) COM3\n2) COM5\n"));
    }

    #[test]
    fn it_should_strip_the_description() {
        let ports = Snapshots::new(&[&["COM4 - USB Serial Device"]]);
        let (result, _) = run(&ports, "1\n");

        assert_eq!(result.unwrap(), Some("COM4".to_string()));
    }

    #[test]
    fn it_should_cancel_on_q() {
        let ports = Snapshots::new(&[&["COM3"]]);

        assert_eq!(run(&ports, "q\n").0.unwrap(), None);
        assert_eq!(run(&ports, " Q \n").0.unwrap(), None);
    }

    #[test]
    fn it_should_not_reprint_an_unchanged_list() {
        let ports = Snapshots::new(&[&["COM3", "COM5"]]);
        let (result, output) = run(&ports, "\nr\n1\n");

        assert_eq!(result.unwrap(), Some("COM3".to_string()));
        assert_eq!(output.matches("Available ports:").count(), 1);
        assert_eq!(*ports.calls.borrow(), 3);
    }

    #[test]
    fn it_should_reprint_a_changed_list() {
        let ports = Snapshots::new(&[&["COM3"], &["COM3", "COM9"]]);
        let (result, output) = run(&ports, "\n2\n");

        assert_eq!(result.unwrap(), Some("COM9".to_string()));
        assert_eq!(output.matches("Available ports:").count(), 2);
        assert!(output.contains("2) COM9"));
    }

    #[test]
    fn it_should_wait_for_a_device_when_no_ports_exist() {
        let ports = Snapshots::new(&[&[], &["/dev/ttyACM0"]]);
        let (result, output) = run(&ports, "\n1\n");

        assert_eq!(result.unwrap(), Some("/dev/ttyACM0".to_string()));
        assert!(output.starts_with("No ports found."));
    }

    #[test]
    fn it_should_reject_invalid_choices_without_refreshing() {
        let ports = Snapshots::new(&[&["COM3", "COM5"]]);
        let (result, output) = run(&ports, "0\n3\nx\n1\n");

        assert_eq!(result.unwrap(), Some("COM3".to_string()));
        assert_eq!(output.matches("Invalid choice.").count(), 3);
        assert_eq!(*ports.calls.borrow(), 1);
    }

    #[test]
    fn it_should_reject_a_line_that_is_not_utf8() {
        let ports = Snapshots::new(&[&["COM3", "COM5"]]);
        let mut output = Vec::new();
        let result = choose_port(&ports, &mut Cursor::new(&b"\xc3\n1\n"[..]), &mut output);

        assert_eq!(result.unwrap(), Some("COM3".to_string()));
        assert_eq!(
            String::from_utf8(output).unwrap().matches("Invalid choice.").count(),
            1
        );
        assert_eq!(*ports.calls.borrow(), 1);
    }

    #[test]
    fn it_should_fail_when_input_ends() {
        let ports = Snapshots::new(&[&["COM3"]]);

        assert!(matches!(run(&ports, "").0, Err(Error::InputClosed)));
    }
}
