use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::debug;
use regdfa::{parse_regex, Alphabet, Dfa, Nfa};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Stage {
    /// Thompson NFA
    Nfa,
    /// Subset construction DFA
    Dfa,
    /// Minimal DFA
    Min,
}

/// Compiles a regex over a custom alphabet and prints the automaton as JSON
#[derive(Parser, Debug)]
#[command(name = "regdfa")]
struct Args {
    /// Regex using '+' for alternation, '*', '(' ')' and '{n}', '{n,m}', '{n,}'
    #[arg(short, long)]
    regex: String,

    /// Alphabet symbols separated by spaces or commas
    #[arg(short, long)]
    alphabet: String,

    /// Which automaton to print
    #[arg(long, value_enum, default_value_t = Stage::Min)]
    stage: Stage,

    /// Words to test against the compiled automaton
    #[arg(value_name = "WORD")]
    words: Vec<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let alphabet = Alphabet::parse_list(&args.alphabet);
    let ast = parse_regex(&args.regex, &alphabet)?;
    debug!("syntax tree:\n{}", ast);

    let nfa = Nfa::from_ast(&ast);
    let dfa = Dfa::from_nfa(&nfa);

    let dfa = if args.stage == Stage::Dfa {
        dfa
    } else {
        dfa.minimize()
    };

    let json = match args.stage {
        Stage::Nfa => nfa.to_serialized().to_json()?,
        Stage::Dfa | Stage::Min => dfa.to_serialized().to_json()?,
    };
    println!("{}", json);

    for word in args.words.iter() {
        match dfa.execute(word) {
            Ok(true) => println!("{}\taccept", word),
            Ok(false) => println!("{}\treject", word),
            Err(e) => eprintln!("{}\t{}", word, e),
        }
    }

    Ok(())
}
