mod memory_thread;
mod messages;

use std::io::{self, BufRead};
use std::sync::mpsc;
use std::thread;

use messages::{ThreadToUi, UiToThread};

fn parse_num(s: &str) -> Result<usize, String> {
    let parsed = match s.strip_prefix("0x") {
        Some(hex) => usize::from_str_radix(hex, 16),
        None => s.parse(),
    };

    parsed.map_err(|_| format!("invalid number '{s}'"))
}

fn parse_byte(s: &str) -> Result<u8, String> {
    parse_num(s)?
        .try_into()
        .map_err(|_| format!("byte value '{s}' out of range"))
}

fn parse_word(s: &str) -> Result<u16, String> {
    parse_num(s)?
        .try_into()
        .map_err(|_| format!("word value '{s}' out of range"))
}

fn parse_command(line: &str) -> Result<UiToThread, String> {
    let args: Vec<&str> = line.split_whitespace().collect();

    let expect = |n: usize| {
        if args.len() < n + 1 {
            Err(format!("'{}' expects {} argument(s)", args[0], n))
        } else {
            Ok(())
        }
    };

    match args.first().copied() {
        Some("lb") => {
            expect(1)?;
            Ok(UiToThread::LoadByte(parse_num(args[1])?))
        }
        Some("sb") => {
            expect(2)?;
            let is_instruction = args.get(3) != Some(&"data");
            Ok(UiToThread::StoreByte(
                parse_num(args[1])?,
                parse_byte(args[2])?,
                is_instruction,
            ))
        }
        Some("lw") => {
            expect(1)?;
            Ok(UiToThread::LoadWord(parse_num(args[1])?))
        }
        Some("sw") => {
            expect(2)?;
            let is_instruction = args.get(3) != Some(&"data");
            Ok(UiToThread::StoreWord(
                parse_num(args[1])?,
                parse_word(args[2])?,
                is_instruction,
            ))
        }
        Some("fill") => {
            expect(2)?;
            let values = args[2..]
                .iter()
                .map(|s| parse_byte(s))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(UiToThread::FillBytes(parse_num(args[1])?, values))
        }
        Some("region") => {
            expect(3)?;
            Ok(UiToThread::AddRegion {
                name: args[1].to_string(),
                start: parse_num(args[2])?,
                end: parse_num(args[3])?,
                read_only: args.get(4) == Some(&"ro"),
            })
        }
        Some("rm") => {
            expect(1)?;
            Ok(UiToThread::RemoveRegion(args[1].to_string()))
        }
        Some("mem") => {
            expect(2)?;
            Ok(UiToThread::RequestMemory(
                parse_num(args[1])?,
                parse_num(args[2])?,
            ))
        }
        Some("reset") => Ok(UiToThread::Reset),
        Some("size") => {
            expect(1)?;
            Ok(UiToThread::SetSize(parse_num(args[1])?))
        }
        Some("exit") => Ok(UiToThread::Exit),
        Some(other) => Err(format!("unknown command '{other}'")),
        None => Err("empty command".to_string()),
    }
}

fn print_help() {
    println!("commands:");
    println!("  lb <addr>                     load a byte");
    println!("  sb <addr> <val> [data]        store a byte (data = bypass read-only)");
    println!("  lw <addr>                     load a big-endian word");
    println!("  sw <addr> <val> [data]        store a big-endian word");
    println!("  fill <addr> <byte...>         bulk store");
    println!("  region <name> <start> <end> [ro]   add a region");
    println!("  rm <id>                       remove a region");
    println!("  mem <start> <count>           dump memory");
    println!("  reset                         zero all non-region cells");
    println!("  size <n>                      resize memory, clearing regions");
    println!("  exit");
}

fn print_memory(start: usize, data: &[u8]) {
    for (row, chunk) in data.chunks(16).enumerate() {
        let line = chunk
            .iter()
            .map(|v| format!("{v:02x}"))
            .collect::<Vec<_>>()
            .join(" ");
        println!("0x{:04x}: {line}", start + 16 * row);
    }
}

fn main() {
    env_logger::init();

    let (tx_ui, rx_thread) = mpsc::channel();
    let (tx_thread, rx_ui) = mpsc::channel();

    let handle = thread::spawn(move || memory_thread::memory_thread(rx_thread, tx_thread));

    println!("vmem monitor; 'help' lists commands");

    for line in io::stdin().lock().lines() {
        let Ok(line) = line else { break };
        let line = line.trim();

        if line.is_empty() {
            continue;
        }
        if line == "help" {
            print_help();
            continue;
        }

        let msg = match parse_command(line) {
            Ok(m) => m,
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };

        let exiting = matches!(msg, UiToThread::Exit);
        if tx_ui.send(msg).is_err() {
            break;
        }

        loop {
            match rx_ui.recv() {
                Ok(ThreadToUi::Ready) => break,
                Ok(ThreadToUi::Operation(op)) => println!("[event] {op:?}"),
                Ok(ThreadToUi::LogMessage(text)) => println!("{text}"),
                Ok(ThreadToUi::ResponseMemory(start, data)) => print_memory(start, &data),
                Ok(ThreadToUi::ThreadExit) | Err(_) => break,
            }
        }

        if exiting {
            break;
        }
    }

    let _ = tx_ui.send(UiToThread::Exit);
    drop(tx_ui);
    let _ = handle.join();
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test numeric parsing in both bases
    #[test]
    fn test_parse_num() {
        assert_eq!(parse_num("42"), Ok(42));
        assert_eq!(parse_num("0x2a"), Ok(42));
        assert!(parse_num("zzz").is_err());
        assert!(parse_byte("256").is_err());
        assert!(parse_word("0x10000").is_err());
    }

    /// Test the store commands and the data-write flag
    #[test]
    fn test_parse_store() {
        assert!(matches!(
            parse_command("sb 0x10 255"),
            Ok(UiToThread::StoreByte(0x10, 255, true))
        ));
        assert!(matches!(
            parse_command("sb 16 1 data"),
            Ok(UiToThread::StoreByte(16, 1, false))
        ));
        assert!(matches!(
            parse_command("sw 0 0xabcd"),
            Ok(UiToThread::StoreWord(0, 0xABCD, true))
        ));
        assert!(parse_command("sb 16").is_err());
    }

    /// Test region commands
    #[test]
    fn test_parse_region() {
        match parse_command("region rom 0 15 ro") {
            Ok(UiToThread::AddRegion {
                name,
                start,
                end,
                read_only,
            }) => {
                assert_eq!(name, "rom");
                assert_eq!(start, 0);
                assert_eq!(end, 15);
                assert!(read_only);
            }
            _ => panic!("expected AddRegion"),
        }

        match parse_command("region stack 0x100 0x1ff") {
            Ok(UiToThread::AddRegion { read_only, .. }) => assert!(!read_only),
            _ => panic!("expected AddRegion"),
        }
    }

    /// Test the fill command value list
    #[test]
    fn test_parse_fill() {
        match parse_command("fill 100 10 20 30 40") {
            Ok(UiToThread::FillBytes(100, values)) => assert_eq!(values, vec![10, 20, 30, 40]),
            _ => panic!("expected FillBytes"),
        }
        assert!(parse_command("fill 100 300").is_err());
    }

    /// Test rejection of unknown input
    #[test]
    fn test_parse_unknown() {
        assert!(parse_command("flub 1 2").is_err());
    }
}
