use color_print::ceprintln;
use dasm::{disassemble, dump::write_dump, Config, Error};
use std::io::Write;

const HELP_TEMPLATE: &str = "\
{before-help}{bin} {version}
  {about}

{usage-heading}
{tab}{usage}

{all-args}{after-help}";

#[derive(Debug, clap::Parser)]
#[clap(version, about, help_template = HELP_TEMPLATE)]
struct Args {
    /// Input file of 8086 machine code
    input: String,

    /// Output file [default: stdout]
    #[clap(short, long)]
    output: Option<String>,

    /// Dump addresses, machine bytes and decoded text
    #[clap(short, long)]
    dump: bool,

    /// YAML config file
    #[clap(short, long)]
    config: Option<String>,
}

fn main() {
    use clap::Parser;

    let args: Args = Args::parse();
    ceprintln!("<bold>8086 Disassembler</>");

    let cfg = match &args.config {
        Some(path) => Config::load(path).unwrap_or_else(|err| fail(&err, path, &[])),
        None => Config::default(),
    };
    let output = args.output.clone().or(cfg.output.clone());
    let dump = args.dump || cfg.dump;

    eprintln!("1. Read File");
    eprintln!("  < {}", &args.input);
    let raw = std::fs::read(&args.input)
        .unwrap_or_else(|e| fail(&Error::FileOpen(args.input.clone(), e), &args.input, &[]));
    let (bytes, clipped) = cfg.clip(&raw);
    if clipped {
        ceprintln!(
            "<yellow,bold>warn</>: input is {} bytes, decoding the first {}",
            raw.len(),
            bytes.len()
        );
    }
    if bytes.is_empty() {
        ceprintln!("<green,bold>note</>: nothing to decode");
        return;
    }

    eprintln!("2. Decode & Resolve Labels");
    let listing = disassemble(bytes).unwrap_or_else(|err| fail(&err, &args.input, bytes));
    eprintln!(
        "  {} instructions, {} labels",
        listing.lines.len(),
        listing.labels.len()
    );

    eprintln!("3. Write Listing");
    match &output {
        Some(path) => {
            eprintln!("  > {}", path);
            write(path, &listing.to_string()).unwrap_or_else(|err| fail(&err, path, &[]));
        }
        None => print!("{}", listing),
    }

    if dump {
        let _ = write_dump(&mut std::io::stderr().lock(), &args.input, &listing, bytes);
    }
}

fn write(path: &str, text: &str) -> Result<(), Error> {
    let mut file =
        std::fs::File::create(path).map_err(|e| Error::FileCreate(path.to_string(), e))?;
    file.write_all(text.as_bytes())
        .map_err(|e| Error::FileWrite(path.to_string(), e))
}

fn fail(err: &Error, file: &str, bytes: &[u8]) -> ! {
    err.print_diag(file, bytes);
    std::process::exit(1)
}
