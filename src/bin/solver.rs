//! CLI front-end: `solver [<cost_info> <monitoring_info> <query> <goals>]
//! [-dcList] [-strongSLA] [-openMP] [-zdd] [-export] [-getconfig N]`.
//!
//! Flag names and output format mirror `trips-zdd.cpp::main` exactly, down
//! to the "1st/2nd/3rd/Nth" suffix table, which only special-cases 1, 2, 3.

use std::io::BufRead;
use std::path::PathBuf;
use std::process::ExitCode;

use num_bigint::BigUint;
use structopt::StructOpt;

use geotiering_solver::common::error::{CliUsage, GResult};
use geotiering_solver::encode::Encoder;
use geotiering_solver::enumerate::WeightedEnumerator;
use geotiering_solver::eval::{cardinality, optimal_placement};
use geotiering_solver::params::instance::from_dc_list;
use geotiering_solver::params::json::from_json;
use geotiering_solver::params::{ParameterStore, SlaMode};
use geotiering_solver::spec::PlacementSpec;
use geotiering_solver::zdd::builder::ZddBuilder;
use geotiering_solver::zdd::{export, reduce};

#[derive(Debug, StructOpt)]
#[structopt(name = "solver", about = "Geo-distributed storage tiering and placement solver")]
struct Cli {
  /// path to cost_info JSON
  cost_info: Option<PathBuf>,
  /// path to monitoring_info JSON
  monitoring_info: Option<PathBuf>,
  /// path to query JSON
  query: Option<PathBuf>,
  /// path to goals JSON
  goals: Option<PathBuf>,

  /// read a dcList instance from stdin instead of JSON
  #[structopt(long = "dcList")]
  dc_list: bool,
  /// use the strong-consistency latency SLA instead of eventual
  #[structopt(long = "strongSLA")]
  strong_sla: bool,
  /// build the ZDD with rayon parallelism
  #[structopt(long = "openMP")]
  open_mp: bool,
  /// dump the reduced ZDD in DOT format
  #[structopt(long = "zdd")]
  dump_zdd: bool,
  /// dump the reduced ZDD in the native line-based format
  #[structopt(long = "export")]
  dump_export: bool,
  /// enumerate the N cheapest placements
  #[structopt(long = "getconfig")]
  getconfig: Option<usize>,
}

fn load_params(args: &Cli) -> GResult<ParameterStore> {
  if let (Some(c), Some(m), Some(q), Some(g)) = (&args.cost_info, &args.monitoring_info, &args.query, &args.goals) {
    return from_json(c, m, q, g);
  }

  if args.dc_list {
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let line = line.trim();
    if line.is_empty() {
      return Err(CliUsage::boxed("-dcList requires a whitespace-separated integer list on stdin"));
    }
    let dc_list: Vec<usize> = line
      .split_whitespace()
      .map(|tok| tok.parse::<usize>())
      .collect::<Result<_, _>>()
      .map_err(|e| CliUsage::boxed(format!("malformed dcList entry: {}", e)))?;
    let mut rng = rand::thread_rng();
    return from_dc_list(&dc_list, &mut rng);
  }

  // Default instance: two DCs with two tiers each, matching `setInstance()`'s
  // default argument (`std::vector<int> const& dcList = {2, 2}`).
  let mut rng = rand::thread_rng();
  from_dc_list(&[2, 2], &mut rng)
}

/// `trips-zdd.cpp` only special-cases ranks 1-3; every other rank prints
/// "th" verbatim, including 11th/21st/etc.
fn ordinal_suffix(rank: usize) -> &'static str {
  match rank {
    1 => "st",
    2 => "nd",
    3 => "rd",
    _ => "th",
  }
}

fn print_placements(
  zdd: &geotiering_solver::zdd::Zdd,
  encoder: &Encoder,
  params: &ParameterStore,
  n: usize,
) {
  let enumerator = WeightedEnumerator::new(zdd.clone(), encoder, params);
  for (rank, (cost, placement)) in enumerator.take(n).enumerate() {
    let rank = rank + 1;
    println!();
    println!("{}{} Best Placement", rank, ordinal_suffix(rank));
    println!("Data Placement");
    println!("{}", placement.storage_tiers.join(" "));
    println!();
    println!("Target Locale List");
    for (dc, tiers) in &placement.locales {
      println!("{} -> {}", dc, tiers.join(" "));
    }
    println!();
    println!("Current Cost = {:.10}", cost);
  }
}

fn build_zdd(spec: &PlacementSpec, parallel: bool) -> geotiering_solver::zdd::Zdd {
  if !parallel {
    return ZddBuilder::new(spec).build();
  }
  match std::env::var("OMP_NUM_THREADS").ok().and_then(|v| v.parse::<usize>().ok()) {
    Some(threads) => match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
      Ok(pool) => pool.install(|| ZddBuilder::build_parallel(spec)),
      Err(e) => {
        log::warn!("failed to size rayon pool to OMP_NUM_THREADS={}: {}", threads, e);
        ZddBuilder::build_parallel(spec)
      }
    },
    None => ZddBuilder::build_parallel(spec),
  }
}

fn main_guarded() -> GResult<()> {
  env_logger::Builder::from_default_env().format_timestamp_micros().init();

  let args = Cli::from_args();
  log::info!("{:?}", args);

  let params = load_params(&args)?;
  log::info!("loaded instance: D={}, T={}", params.num_dc(), params.num_tier());

  let encoder = Encoder::new(&params);
  let sla_mode = if args.strong_sla { SlaMode::Strong } else { SlaMode::Eventual };
  let spec = PlacementSpec::new(&params, &encoder, sla_mode);

  let zdd = build_zdd(&spec, args.open_mp);
  let reduced = reduce(&zdd);
  log::info!("reduced ZDD: {} nodes", reduced.num_nodes());

  let card = cardinality(&reduced);
  let (optimal_cost, _placement) = optimal_placement(&reduced, &encoder, &params);
  let display_cost = if card == BigUint::from(0u32) { 0.0 } else { optimal_cost };

  println!(
    "#variable = {}, #node = {}, #solution = {}, Minimum cost = {:.10}",
    encoder.num_variables(),
    reduced.num_nodes(),
    card,
    display_cost
  );

  if let Some(n) = args.getconfig {
    if card == BigUint::from(0u32) {
      println!("No solutions found");
    } else {
      print_placements(&reduced, &encoder, &params, n);
    }
  }

  if args.dump_zdd && !reduced.is_empty() {
    println!("{}", export::to_dot(&reduced));
  }
  if args.dump_export && !reduced.is_empty() {
    println!("{}", export::to_export(&reduced));
  }

  Ok(())
}

fn main() -> ExitCode {
  match main_guarded() {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      eprintln!("{}", e);
      ExitCode::from(1)
    }
  }
}
