// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Pirsch CLI - report page views, events and sessions from a terminal.
//!
//! The page being reported is described in a TOML file (see [`config`]),
//! with the URL, title and referrer overridable on the command line. The
//! same consent and path checks as in a browser apply: a blocked page
//! sends nothing.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pirsch_beacon::{
	evaluate, Beacon, BeaconConfig, EventMeta, EventOptions, GateDecision, PageSnapshot, Variant,
};

mod config;

use config::{CliConfig, PageOverrides};

/// Pirsch - privacy-friendly analytics from the command line
#[derive(Parser, Debug)]
#[command(name = "pirsch", version, about, long_about = None)]
struct Args {
	/// Path to the configuration file
	#[arg(short, long, env = "PIRSCH_CONFIG")]
	config: Option<PathBuf>,

	/// Log level (overrides config)
	#[arg(short, long)]
	log_level: Option<String>,

	/// Output logs as JSON
	#[arg(long)]
	json_logs: bool,

	/// Page URL (overrides config)
	#[arg(long)]
	url: Option<String>,

	/// Page title (overrides config)
	#[arg(long)]
	title: Option<String>,

	/// Referrer (overrides config)
	#[arg(long)]
	referrer: Option<String>,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Send one page view and wait for the collector
	Hit,
	/// Send a custom event and wait for the collector
	Event {
		/// Event name
		name: String,
		/// Duration attached to the event
		#[arg(long)]
		duration: Option<f64>,
		/// Metadata entry (repeatable: --meta KEY=VALUE)
		#[arg(long, value_name = "KEY=VALUE")]
		meta: Vec<String>,
	},
	/// Keep the session alive until interrupted
	Session {
		/// Stop after this many keep-alive rounds
		#[arg(long)]
		ticks: Option<u32>,
	},
	/// Print the tracking decision for each variant
	Check,
}

#[tokio::main]
async fn main() -> Result<()> {
	let args = Args::parse();

	let config = CliConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
	init_tracing(
		args.log_level.as_deref().or(config.log_level.as_deref()),
		args.json_logs,
	);

	let overrides = PageOverrides {
		url: args.url.clone(),
		title: args.title.clone(),
		referrer: args.referrer.clone(),
	};
	let page = config.page(&overrides)?;
	debug!(url = %page.url, "Loaded page");

	match args.command {
		Command::Hit => run_hit(&config, page).await,
		Command::Event {
			name,
			duration,
			meta,
		} => run_event(&config, page, &name, duration, &meta).await,
		Command::Session { ticks } => run_session(&config, page, ticks).await,
		Command::Check => run_check(&page),
	}
}

fn init_tracing(level: Option<&str>, json: bool) {
	let level = level.unwrap_or("info");
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		EnvFilter::new(format!(
			"pirsch={level},pirsch_beacon={level},pirsch_beacon_core={level}"
		))
	});

	if json {
		tracing_subscriber::registry()
			.with(filter)
			.with(fmt::layer().json().with_writer(std::io::stderr))
			.init();
	} else {
		tracing_subscriber::registry()
			.with(filter)
			.with(fmt::layer().compact().with_writer(std::io::stderr))
			.init();
	}
}

// The beacon path hands the request to a background task that would be
// cut off when the process exits, so the CLI always waits on the POST.
fn build_beacon(config: &CliConfig, page: PageSnapshot) -> Result<Beacon> {
	let mut builder = Beacon::builder().page(page).disable_beacon();
	if let Some(timeout) = config.request_timeout() {
		builder = builder.request_timeout(timeout);
	}
	if let Some(user_agent) = &config.user_agent {
		builder = builder.user_agent(user_agent.clone());
	}
	builder.build().context("Failed to create beacon")
}

async fn run_hit(config: &CliConfig, page: PageSnapshot) -> Result<()> {
	let beacon = build_beacon(config, page)?;
	let Some(tracker) = beacon.page_view_tracker() else {
		println!("Tracking disabled for this page, nothing sent");
		return Ok(());
	};

	tracker.report().await.context("Page view was not accepted")?;
	println!("Page view sent");
	Ok(())
}

async fn run_event(
	config: &CliConfig,
	page: PageSnapshot,
	name: &str,
	duration: Option<f64>,
	meta: &[String],
) -> Result<()> {
	let mut options = EventOptions::new().meta(parse_meta(meta)?);
	if let Some(duration) = duration {
		options = options.duration(duration);
	}

	let beacon = build_beacon(config, page)?;
	let Some(events) = beacon.events() else {
		println!("Tracking disabled for this page, nothing sent");
		return Ok(());
	};

	events
		.event(name, options)
		.await
		.with_context(|| format!("Event '{name}' was not accepted"))?;
	println!("Event '{name}' sent");
	Ok(())
}

async fn run_session(config: &CliConfig, page: PageSnapshot, ticks: Option<u32>) -> Result<()> {
	let beacon = build_beacon(config, page)?;
	let Some(keeper) = beacon.sessions() else {
		println!("Tracking disabled for this page, nothing sent");
		return Ok(());
	};

	match ticks {
		Some(ticks) => {
			let run_for = session_run_time(keeper.interval(), ticks);
			info!(ticks, "Keeping session alive");
			tokio::select! {
				_ = tokio::time::sleep(run_for) => {}
				_ = tokio::signal::ctrl_c() => info!("Interrupted"),
			}
		}
		None => {
			info!("Keeping session alive, press Ctrl-C to stop");
			tokio::signal::ctrl_c()
				.await
				.context("Failed to listen for Ctrl-C")?;
		}
	}

	keeper.stop();
	Ok(())
}

// Half an interval of slack lets the last round's requests finish.
fn session_run_time(interval: Duration, ticks: u32) -> Duration {
	interval
		.checked_mul(ticks)
		.and_then(|run| run.checked_add(interval / 2))
		.unwrap_or(Duration::MAX)
}

fn run_check(page: &PageSnapshot) -> Result<()> {
	for variant in [Variant::PageView, Variant::Events, Variant::Sessions] {
		let config = BeaconConfig::load(variant, page);
		let line = match evaluate(page, &config) {
			GateDecision::Allowed => json!({
				"variant": variant.to_string(),
				"tracked": true,
				"endpoint": config.endpoint,
			}),
			GateDecision::Blocked(reason) => json!({
				"variant": variant.to_string(),
				"tracked": false,
				"reason": reason.to_string(),
			}),
		};
		println!("{line}");
	}
	Ok(())
}

fn parse_meta(entries: &[String]) -> Result<EventMeta> {
	let mut meta = EventMeta::new();
	for entry in entries {
		let Some((key, value)) = entry.split_once('=') else {
			bail!("Invalid --meta '{entry}', expected KEY=VALUE");
		};
		if key.is_empty() {
			bail!("Invalid --meta '{entry}', key is empty");
		}
		meta = meta.insert(key, value);
	}
	Ok(meta)
}
