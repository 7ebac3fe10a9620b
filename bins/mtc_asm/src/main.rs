use clap::Parser;
use mtc_assembler::diagnostics::Diagnostics;
use mtc_assembler::Program;
use mtc_instruction::{InstructionCatalog, OperandKind, RegisterName};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, Level};

/// Assemble source files and print the symbols and an instruction listing.
#[derive(Parser, Debug)]
#[command(name = "mtc-asm", version, about)]
struct Args {
    #[arg(required = true)]
    sources: Vec<PathBuf>,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn operand(program: &Program, kind: OperandKind, word: u16) -> String {
    let symbol = || {
        program
            .data_symbols()
            .into_iter()
            .find(|(_, address)| *address == word)
            .map(|(name, _)| name.to_string())
            .unwrap_or_else(|| format!("{:#06x}", word))
    };

    match kind {
        OperandKind::Register => RegisterName::from_encoding(word)
            .map(|name| name.to_string())
            .unwrap_or_else(|| format!("?{}", word)),
        OperandKind::Direct => symbol(),
        OperandKind::Indirect => format!("[{}]", symbol()),
        OperandKind::Immediate => format!("{:#06x}", word),
    }
}

/// One line per instruction: address, raw words and the decoded instruction.
fn listing(program: &Program) -> Vec<String> {
    let catalog = InstructionCatalog::get();
    let image = program.image();

    let mut lines = vec![];
    let mut address = program.entry() as usize;
    while address < image.len() {
        let entry = match catalog.decode(image[address]) {
            Ok(entry) => entry,
            Err(err) => {
                lines.push(format!("{:04X}  {:04X}            {}", address, image[address], err));
                address += 1;
                continue;
            }
        };

        let words = &image[address..(address + 1 + entry.operand_count()).min(image.len())];
        let raw = words
            .iter()
            .map(|word| format!("{:04X}", word))
            .collect::<Vec<_>>()
            .join(" ");

        let kinds = [entry.signature.destination(), entry.signature.source()];
        let operands = kinds
            .iter()
            .zip(words.iter().skip(1))
            .filter_map(|(kind, word)| kind.map(|kind| operand(program, kind, *word)))
            .collect::<Vec<_>>()
            .join(", ");

        lines.push(format!(
            "{:04X}  {:<14}  {} {}",
            address, raw, entry.operation, operands
        ));
        address += words.len();
    }

    lines
}

fn print_program(path: &Path, program: &Program) {
    println!("{}: {} words, entry at {:04X}", path.display(), program.len(), program.entry());

    for (name, address) in program.data_symbols() {
        println!("  data   {:04X}  {}", address, name);
    }
    for (name, address) in program.labels() {
        println!("  label  {:04X}  {}", address, name);
    }
    for line in listing(program) {
        println!("  {}", line.trim_end());
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let mut result = ExitCode::SUCCESS;

    for path in &args.sources {
        let source = match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(err) => {
                error!("Could not read source file. ({}) ({})", path.display(), err);
                result = ExitCode::FAILURE;
                continue;
            }
        };

        match mtc_assembler::load(&source) {
            Ok(program) => print_program(path, &program),
            Err(err) => {
                let mut diags = Diagnostics::new(&source, path.display().to_string());
                diags.report(&err);
                if let Err(err) = diags.print(&mut std::io::stderr()) {
                    error!("{}", err);
                }
                result = ExitCode::FAILURE;
            }
        }
    }

    result
}
