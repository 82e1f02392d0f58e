//! Password generator.

use clap::Args;
use cipher_vault_sync::analytics::classify_strength;
use cipher_vault_sync::generator::{self, GeneratorOptions, DEFAULT_LENGTH};

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Password length
    #[arg(short, long, default_value_t = DEFAULT_LENGTH)]
    pub length: usize,

    /// Leave out uppercase letters
    #[arg(long)]
    pub no_uppercase: bool,

    /// Leave out lowercase letters
    #[arg(long)]
    pub no_lowercase: bool,

    /// Leave out digits
    #[arg(long)]
    pub no_digits: bool,

    /// Leave out symbols
    #[arg(long)]
    pub no_symbols: bool,

    /// Allow look-alike characters such as brackets and quotes
    #[arg(long)]
    pub allow_ambiguous: bool,

    /// Number of passwords to print
    #[arg(short, long, default_value_t = 1)]
    pub count: usize,
}

impl From<&GenerateArgs> for GeneratorOptions {
    fn from(args: &GenerateArgs) -> Self {
        Self {
            length: args.length,
            uppercase: !args.no_uppercase,
            lowercase: !args.no_lowercase,
            digits: !args.no_digits,
            symbols: !args.no_symbols,
            exclude_ambiguous: !args.allow_ambiguous,
        }
    }
}

/// Generation needs no vault session.
pub fn run(args: GenerateArgs) -> anyhow::Result<()> {
    let options = GeneratorOptions::from(&args);
    if options.charset().is_empty() {
        anyhow::bail!("At least one character class must be enabled");
    }

    for _ in 0..args.count.max(1) {
        let password = generator::generate(&options);
        println!("{password}  ({})", classify_strength(&password).label);
    }
    Ok(())
}
