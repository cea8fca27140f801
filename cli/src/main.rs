use ::std::{fs, io, path::PathBuf};
use anyhow::Context;
use clap::{ArgGroup, Parser, ValueEnum};
use slipgram::{DecoderBuilder, Order};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OrderArg {
    Bi,
    Tri,
}

impl From<OrderArg> for Order {
    #[inline]
    fn from(order: OrderArg) -> Self {
        match order {
            OrderArg::Bi => Order::Bi,
            OrderArg::Tri => Order::Tri,
        }
    }
}

/// Corrects keyboard slips in lowercase text
#[derive(Debug, Parser)]
#[command(version, about)]
#[command(group(ArgGroup::new("input").required(true).args(["file", "string"])))]
struct Args {
    /// File with the text to correct, newlines are ignored
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Text to correct
    #[arg(short, long)]
    string: Option<String>,

    /// Transition log-probabilities, one `i j [k] logprob` record per line
    #[arg(short, long, required = true)]
    probs: PathBuf,

    #[arg(short, long, value_enum, default_value = "bi")]
    order: OrderArg,

    /// Log-probability of the transitions missing from the probabilities file
    #[arg(long, allow_hyphen_values = true)]
    unseen: Option<f64>,

    /// Probability of hitting one particular neighbouring key
    #[arg(long)]
    slip: Option<f64>,

    /// Also print the log-probability of the corrected text
    #[arg(long)]
    score: bool,
}

impl Args {
    fn input(&self) -> anyhow::Result<String> {
        if let Some(text) = &self.string {
            return Ok(text.clone());
        }
        let Some(path) = &self.file else {
            anyhow::bail!("no input given");
        };
        let mut text = fs::read_to_string(path)
            .with_context(|| format!("failed to read input {}", path.display()))?;
        text.retain(|c| c != '\n' && c != '\r');
        Ok(text)
    }

    fn builder(&self) -> DecoderBuilder {
        let mut builder = DecoderBuilder::new(self.order.into()).probabilities(&self.probs);
        if let Some(unseen) = self.unseen {
            builder = builder.unseen_transition(unseen);
        }
        if let Some(slip) = self.slip {
            builder = builder.slip_probability(slip);
        }
        builder
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(true)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let text = args.input()?;
    let decoder = args
        .builder()
        .build()
        .with_context(|| format!("failed to build decoder from {}", args.probs.display()))?;
    let (corrected, score) = decoder
        .correct_scored(&text)
        .context("failed to correct input")?;

    tracing::debug!(chars = text.chars().count(), "input corrected");

    println!("{corrected}");
    if args.score {
        println!("{score}");
    }
    Ok(())
}
