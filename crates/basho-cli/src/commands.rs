use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context as _};
use basho_db::SnapshotTableStore;
use basho_index::{Basho, MergeState, NoPersistedStore, SnapshotProbe};
use basho_server::{BashoServer, ServerConfig};
use basho_store::DataStore;
use basho_types::{code, City, Region};
use colored::Colorize;
use serde::Serialize;
use serde_json::json;

use crate::cli::*;

struct Context {
    basho: Basho,
    format: OutputFormat,
}

impl Context {
    fn open(data: Option<&Path>, db: Option<&Path>, format: OutputFormat) -> Self {
        let store = Arc::new(match data {
            Some(dir) => DataStore::open(dir),
            None => DataStore::bundled(),
        });
        let basho = match db {
            Some(path) => Basho::new(store, SnapshotProbe::new(path)),
            None => Basho::new(store, NoPersistedStore),
        };
        Self { basho, format }
    }

    fn json(&self) -> bool {
        self.format == OutputFormat::Json
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let Cli {
        command,
        format,
        data,
        db,
        ..
    } = cli;
    let ctx = Context::open(data.as_deref(), db.as_deref(), format);
    match command {
        Command::Prefectures(args) => cmd_prefectures(&ctx, args),
        Command::Regions => cmd_regions(&ctx),
        Command::Cities(args) => cmd_cities(&ctx, args),
        Command::City(args) => cmd_city(&ctx, args),
        Command::Postal(args) => cmd_postal(&ctx, args),
        Command::Validate(args) => cmd_validate(&ctx, args),
        Command::CheckDigit(args) => cmd_check_digit(&ctx, args),
        Command::Seed => cmd_seed(&ctx, db.as_deref()),
        Command::VerifyCapitals => cmd_verify_capitals(&ctx),
        Command::Serve(args) => cmd_serve(args, data, db),
    }
}

fn cmd_prefectures(ctx: &Context, args: PrefecturesArgs) -> anyhow::Result<()> {
    let region = match args.region.as_deref() {
        Some(name) => Some(Region::find(name).ok_or_else(|| anyhow!("unknown region: {name}"))?),
        None => None,
    };
    let prefectures = ctx.basho.prefectures_in(region.map(|r| r.name));
    if ctx.json() {
        return print_json(&prefectures);
    }
    for p in &prefectures {
        println!(
            "{:>2} {} {} {}",
            p.code.to_string().yellow(),
            p.name.bold(),
            format!("({})", p.name_en).dimmed(),
            p.region_name.cyan()
        );
    }
    Ok(())
}

fn cmd_regions(ctx: &Context) -> anyhow::Result<()> {
    let regions = ctx.basho.regions();
    if ctx.json() {
        return print_json(regions);
    }
    for region in regions {
        let names: Vec<String> = ctx
            .basho
            .prefectures_of(region)
            .into_iter()
            .map(|p| p.name)
            .collect();
        println!(
            "{} {}  {}",
            region.name.bold(),
            format!("({})", region.name_en).dimmed(),
            names.join(" ")
        );
    }
    Ok(())
}

fn cmd_cities(ctx: &Context, args: CitiesArgs) -> anyhow::Result<()> {
    let prefecture = ctx.basho.resolve_prefecture(&args.prefecture)?;
    let cities = ctx.basho.cities_of(&prefecture);
    if ctx.json() {
        return print_json(&cities);
    }
    println!("{} {} municipalities", prefecture.name.bold(), cities.len());
    for city in &cities {
        let marker = if city.is_capital() { " ★".yellow().to_string() } else { String::new() };
        println!("  {} {}{}", city.code.yellow(), city.full_name(), marker);
    }
    Ok(())
}

fn print_city(ctx: &Context, city: &City) {
    let prefecture = ctx
        .basho
        .prefecture_of(city)
        .map(|p| p.name)
        .unwrap_or_default();
    let status = if city.is_active() {
        "active".green()
    } else {
        "deprecated".red()
    };
    println!(
        "{} {}{}  [{}]",
        city.code.yellow().bold(),
        prefecture,
        city.full_name(),
        status
    );
}

fn cmd_city(ctx: &Context, args: CityArgs) -> anyhow::Result<()> {
    let city = ctx.basho.require_city(&args.code)?;

    if args.chain {
        let chain = ctx.basho.chain(&city);
        if ctx.json() {
            return print_json(&chain);
        }
        for (hop, city) in chain.iter().enumerate() {
            print!("{:>3} ", hop.to_string().dimmed());
            print_city(ctx, city);
        }
        return Ok(());
    }

    let city = if args.current {
        ctx.basho.current(&city)
    } else {
        city
    };
    let state = ctx.basho.merge_state(&city);
    if ctx.json() {
        return print_json(&json!({ "city": city, "merge_state": state }));
    }
    print_city(ctx, &city);
    match state {
        MergeState::Active => {}
        MergeState::DeprecatedWithSuccessor(next) => println!("  merged into {}", next.yellow()),
        MergeState::DeprecatedWithoutSuccessor => println!("  {}", "no successor".dimmed()),
    }
    Ok(())
}

fn cmd_postal(ctx: &Context, args: PostalArgs) -> anyhow::Result<()> {
    let entries = ctx.basho.postal_codes(&args.code);
    if entries.is_empty() {
        bail!("no postal code entries for {}", args.code);
    }
    if ctx.json() {
        return print_json(&entries);
    }
    for entry in &entries {
        let prefecture = ctx
            .basho
            .prefecture_of_postal(entry)
            .map(|p| p.name)
            .unwrap_or_default();
        let city_code = ctx
            .basho
            .city_code_for_postal(entry)
            .unwrap_or_else(|| "------".into());
        println!(
            "{} {}{}{}  {}",
            entry.formatted_code().yellow().bold(),
            prefecture,
            entry.city_name,
            entry.town,
            city_code.dimmed()
        );
    }
    Ok(())
}

fn cmd_validate(ctx: &Context, args: ValidateArgs) -> anyhow::Result<()> {
    let results: Vec<(String, Result<(), basho_types::TypeError>)> = args
        .codes
        .into_iter()
        .map(|c| {
            let result = code::check(&c);
            (c, result)
        })
        .collect();
    let invalid = results.iter().filter(|(_, r)| r.is_err()).count();

    if ctx.json() {
        let report: Vec<_> = results
            .iter()
            .map(|(c, r)| {
                json!({
                    "code": c,
                    "valid": r.is_ok(),
                    "error": r.as_ref().err().map(ToString::to_string),
                })
            })
            .collect();
        print_json(&report)?;
    } else {
        for (c, result) in &results {
            match result {
                Ok(()) => println!("{} {}", "✓".green().bold(), c),
                Err(e) => println!("{} {}  {}", "✗".red().bold(), c, e.to_string().dimmed()),
            }
        }
    }

    if invalid > 0 {
        bail!("{invalid} invalid code(s)");
    }
    Ok(())
}

fn cmd_check_digit(ctx: &Context, args: CheckDigitArgs) -> anyhow::Result<()> {
    let full = code::with_check_digit(&args.prefix)
        .ok_or_else(|| anyhow!("expected five digits, got {:?}", args.prefix))?;
    if ctx.json() {
        return print_json(&json!({ "prefix": args.prefix, "code": full }));
    }
    println!("{}", full.bold());
    Ok(())
}

fn cmd_seed(ctx: &Context, db: Option<&Path>) -> anyhow::Result<()> {
    let path = db.context("seed needs a snapshot path: --db <path>")?;
    let store = SnapshotTableStore::open_or_create(path)
        .with_context(|| format!("cannot open snapshot {}", path.display()))?;
    let report = basho_db::seed(&store, ctx.basho.data())?;
    if ctx.json() {
        return print_json(&report);
    }
    println!(
        "{} Seeded {} prefectures and {} municipalities into {}",
        "✓".green().bold(),
        report.prefectures,
        report.cities,
        path.display().to_string().bold()
    );
    Ok(())
}

fn cmd_verify_capitals(ctx: &Context) -> anyhow::Result<()> {
    let mismatches = ctx.basho.verify_capitals();
    if ctx.json() {
        print_json(&mismatches)?;
    } else {
        for m in &mismatches {
            println!(
                "{} {}: declared={} flagged={} {}",
                m.prefecture_code.to_string().yellow(),
                m.prefecture_name,
                m.declared.red(),
                m.flagged.code.green(),
                m.flagged.name
            );
        }
    }
    if !mismatches.is_empty() {
        bail!("{} prefecture(s) with mismatched capitals", mismatches.len());
    }
    if !ctx.json() {
        println!("{} All capitals agree.", "✓".green().bold());
    }
    Ok(())
}

fn cmd_serve(args: ServeArgs, data: Option<PathBuf>, db: Option<PathBuf>) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)
            .with_context(|| format!("cannot load config {}", path.display()))?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if data.is_some() {
        config.data_dir = data;
    }
    if db.is_some() {
        config.snapshot_path = db;
    }
    println!("basho server on {}", config.bind_addr.to_string().bold());
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(BashoServer::new(config).serve())?;
    Ok(())
}
