use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::warn;
use tracing_subscriber::EnvFilter;
use wavl_tree::{Key, WavlTree};

const SCENARIO: [Key; 10] = [50, 30, 20, 10, 25, 23, 27, 5, 60, 28];

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    /// Level-by-level drawing with ranks
    Pretty,
    /// Graphviz digraph
    Dot,
    /// Keys in ascending order
    Keys,
}

/// Builds a WAVL tree from the given keys and prints it, along with the rebalancing cost of every
/// operation.
#[derive(Debug, Parser)]
struct Options {
    /// Keys to insert, in order
    #[clap(long, value_delimiter = ',', allow_hyphen_values = true, default_values_t = SCENARIO)]
    insert: Vec<Key>,
    /// Keys to delete after all insertions, in order
    #[clap(long, value_delimiter = ',', allow_hyphen_values = true)]
    delete: Vec<Key>,
    /// How to print the final tree
    #[clap(long, value_enum, default_value_t = Format::Pretty)]
    format: Format,
    /// Log filter directives; falls back to `RUST_LOG`
    #[clap(long, env = "WAVL_LOG")]
    log: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let opts = Options::parse();

    let filter = match &opts.log {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid log filter `{directives}`"))?,
        None => EnvFilter::from_default_env(),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut tree = WavlTree::new();

    for &key in &opts.insert {
        match tree.insert(key, key.to_string()) {
            Ok(ops) => println!("insert {key}: {ops} ops"),
            Err(error) => warn!(%error, "insert skipped"),
        }
        tree.assert_invariants();
    }

    for &key in &opts.delete {
        match tree.delete(key) {
            Ok(ops) => println!("delete {key}: {ops} ops"),
            Err(error) => warn!(%error, "delete skipped"),
        }
        tree.assert_invariants();
    }

    println!(
        "size {}, min {:?}, max {:?}",
        tree.len(),
        tree.min(),
        tree.max()
    );

    match opts.format {
        Format::Pretty => print!("{}", tree.pretty()),
        Format::Dot => {
            let mut out = String::new();
            tree.dotgraph("wavl", &mut out)
                .context("failed to render graph")?;
            println!("{out}");
        }
        Format::Keys => println!("{:?}", tree.keys_to_vec()),
    }

    Ok(())
}
