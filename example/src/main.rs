use anyhow::{Result, anyhow};
use clap::Parser;
use syncflow::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Values to print from each example network
    #[clap(short, long, default_value_t = 5)]
    count: usize,

    /// Log every value crossing a task boundary (needs RUST_LOG=trace)
    #[clap(long)]
    trace_values: bool,

    /// Stack size in bytes for task threads
    #[clap(long)]
    stack_size: Option<usize>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = NetworkConfigBuilder::default();
    config.name("demo").trace_values(args.trace_values);
    if let Some(stack_size) = args.stack_size {
        config.stack_size(stack_size);
    }
    let net = Network::with_config(config.build()?);

    let increase = |x: Scalar| x + 1.0;
    let multiply = |x: Scalar, y: Scalar| x * y;
    let sum = |values: &[Scalar]| values.iter().sum::<Scalar>();

    // A one-shot input pushed through a transfer and a prefix.
    let input = net.stream();
    let out = prefix(&net, 3.0)(transfer(&net, increase)(input.clone()));
    let feeder = std::thread::spawn(move || input.send(1.0));
    print_values("prefix(3)(transfer(+1)([1]))", &out, 2)?;
    feeder
        .join()
        .map_err(|_| anyhow!("input feeder panicked"))??;

    let nat = recursion(&net, |c| prefix(&net, 0.0)(transfer(&net, increase)(c)));
    print_values("natural numbers", &nat, args.count)?;

    print_values("factorial", &factorial(&net), args.count)?;

    let ones = constant(&net, 1.0);
    let shifted = transfer2(&net, |x, y| x + y)(ones, nat_generator(&net, 0.0));
    print_values("1 + nat", &shifted, args.count)?;

    let a = vec![constant(&net, 2.0), constant(&net, 5.0)];
    let b = vec![constant(&net, 3.0), constant(&net, 6.0)];
    let products = pairwise(&net, multiply)(a, b);
    for _ in 0..args.count.min(3) {
        let round = products
            .iter()
            .map(Stream::recv)
            .collect::<Result<Vec<_>, _>>()?;
        println!("pairwise product: {round:?}");
    }

    let total = transfer_list(&net, sum)(vec![constant(&net, 1.0), constant(&net, 2.0)]);
    print_values("transfer_list(sum)([1, 2])", &total, args.count.min(3))?;

    for fault in net.faults() {
        warn!(%fault, "network fault");
    }

    let topology = net.topology();
    info!(
        tasks = topology.tasks,
        streams = topology.streams,
        edges = topology.edges,
        "shutting down"
    );
    net.shutdown()?;
    Ok(())
}

fn print_values(label: &str, stream: &Stream, count: usize) -> Result<()> {
    let values = (0..count)
        .map(|_| stream.recv())
        .collect::<Result<Vec<_>, _>>()?;
    println!("{label}: {values:?}");
    Ok(())
}
