use anyhow::{Context, Result};
use clap::Parser;

use vmregex::ast;
use vmregex::automata::compiler::Compiler;
use vmregex::{Error, Executor, ExecutorType};

#[derive(Parser)]
#[command(name = "revm")]
#[command(about = "Run a pattern through the backtracking, Thompson and Pike engines")]
struct Cli {
    /// Pattern to compile
    pattern: String,

    /// Input strings to match
    inputs: Vec<String>,

    /// Only run this engine (backtrack, thompson or pike)
    #[arg(short, long)]
    engine: Option<ExecutorType>,

    /// Pending branch limit for the backtracking engine
    #[arg(long, default_value_t = vmregex::executor::DEFAULT_STACK_LIMIT)]
    stack_limit: usize,

    /// Let the match start anywhere in the input
    #[arg(short, long)]
    search: bool,

    /// Number of capture slots to report (defaults to all groups)
    #[arg(long)]
    slots: Option<usize>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env().init();

    let cli = Cli::parse();

    let ast = ast::parser::Parser::new(cli.pattern.clone())
        .parse()
        .map_err(Error::from)
        .with_context(|| format!("failed to parse {:?}", cli.pattern))?;
    log::debug!("ast: {:?}", ast);
    let program = Compiler::new()
        .unanchored(cli.search)
        .compile(&ast)
        .with_context(|| format!("failed to compile {:?}", cli.pattern))?;
    print!("{}", program);

    let nslots = cli.slots.unwrap_or(program.slot_count());
    let engines: Vec<ExecutorType> = match cli.engine {
        Some(typ) => vec![typ],
        None => ExecutorType::ALL.to_vec(),
    };

    for (i, input) in cli.inputs.iter().enumerate() {
        println!("================ input string: #{} {}", i + 1, input);
        for &typ in &engines {
            let ex = Executor::new(typ).with_stack_limit(cli.stack_limit);
            match ex.exec(&program, input.as_bytes(), nslots) {
                Ok(Some(caps)) => println!("[{}] match {}", typ, caps),
                Ok(None) => println!("[{}] -no match-", typ),
                Err(e) => println!("[{}] error: {}", typ, e),
            }
        }
    }
    Ok(())
}
