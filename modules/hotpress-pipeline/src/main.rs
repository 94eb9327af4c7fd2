use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ai_client::DeepSeekClient;
use hotpress_common::Config;
use hotpress_pipeline::crawler::TrendingCrawler;
use hotpress_pipeline::filter::DeepSeekSafetyFilter;
use hotpress_pipeline::generator::DeepSeekGenerator;
use hotpress_pipeline::illustrator::HunyuanIllustrator;
use hotpress_pipeline::publisher::SessionPublisher;
use hotpress_pipeline::{
    topics, CoverMode, CoverParams, Orchestrator, PublishLedger, PublishOptions, RunStats,
};
use hunyuan_client::HunyuanClient;
use toutiao_client::{load_cookies, ToutiaoPublisher};

#[derive(Parser)]
#[command(name = "hotpress", about = "Automated trending-topic publishing pipeline")]
struct Cli {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand)]
enum Mode {
    /// Crawl trending topics and persist the safety-filtered set.
    Crawl(CrawlArgs),
    /// Generate and publish articles from an existing filtered set,
    /// skipping everything the ledger already holds.
    Publish(PublishArgs),
    /// Crawl, then generate and publish the fresh set.
    Full {
        #[command(flatten)]
        crawl: CrawlArgs,
        #[command(flatten)]
        publish: PublishArgs,
    },
}

#[derive(Args)]
struct CrawlArgs {
    /// Maximum number of topics to crawl.
    #[arg(long, default_value_t = 100)]
    crawl_limit: usize,

    /// Filtered-topic set file (crawl output, publish input).
    #[arg(long, default_value = "filtered_topics.json")]
    topics_file: PathBuf,
}

#[derive(Args)]
struct PublishArgs {
    /// Filtered-topic set file to consume (publish mode only).
    #[arg(long, default_value = "filtered_topics.json")]
    input: PathBuf,

    /// Limit the number of units driven to a terminal state.
    #[arg(long)]
    generate_limit: Option<usize>,

    /// Pause after each generation API call, in seconds.
    #[arg(long, default_value_t = 1.5)]
    generate_delay: f64,

    /// Pause between publishes, in seconds (default 15 minutes).
    #[arg(long, default_value_t = 900.0)]
    publish_delay: f64,

    /// Directory for generated article markdown.
    #[arg(long, default_value = "generated_articles")]
    article_dir: PathBuf,

    /// Directory for generated cover images.
    #[arg(long, default_value = "generated_images")]
    image_dir: PathBuf,

    /// Publish ledger (dedup ground truth).
    #[arg(long, default_value = "publish_ledger.json")]
    ledger: PathBuf,

    /// Session cookie file (JSON list).
    #[arg(long, default_value = "cookies/toutiao.json")]
    cookies: PathBuf,

    /// Cover handling.
    #[arg(long, value_enum, default_value_t = CoverArg::Generate)]
    cover_mode: CoverArg,

    /// Cover style preset number.
    #[arg(long)]
    cover_style: Option<String>,

    /// Cover resolution, e.g. 1024:1024.
    #[arg(long)]
    cover_resolution: Option<String>,

    /// Cover negative prompt.
    #[arg(long, default_value = "")]
    cover_negative: String,

    /// Stamp the provider watermark on covers.
    #[arg(long, default_value_t = false)]
    cover_watermark: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum CoverArg {
    None,
    Generate,
}

impl PublishArgs {
    fn options(&self) -> PublishOptions {
        PublishOptions {
            limit: self.generate_limit,
            generate_delay: Duration::from_secs_f64(self.generate_delay),
            publish_delay: Duration::from_secs_f64(self.publish_delay),
            cover_mode: match self.cover_mode {
                CoverArg::None => CoverMode::None,
                CoverArg::Generate => CoverMode::Generate,
            },
            cover_params: CoverParams {
                style: self.cover_style.clone(),
                resolution: self.cover_resolution.clone(),
                negative_prompt: self.cover_negative.clone(),
                watermark: self.cover_watermark,
            },
            article_dir: self.article_dir.clone(),
            image_dir: self.image_dir.clone(),
        }
    }
}

fn build_orchestrator(config: &Config, ledger_path: &PathBuf, cookies: Vec<toutiao_client::Cookie>) -> Result<Orchestrator> {
    let chat = || {
        DeepSeekClient::new(&config.deepseek_api_key, &config.deepseek_model)
            .with_base_url(&config.deepseek_base_url)
    };
    let hunyuan = HunyuanClient::new(
        &config.hunyuan_secret_id,
        &config.hunyuan_secret_key,
        &config.hunyuan_region,
    );
    let toutiao = ToutiaoPublisher::new(
        &config.browserless_url,
        config.browserless_token.as_deref(),
        cookies,
    );

    Ok(Orchestrator::new(
        Box::new(TrendingCrawler::new()),
        Box::new(DeepSeekSafetyFilter::new(chat())),
        Box::new(DeepSeekGenerator::new(chat())),
        Box::new(HunyuanIllustrator::new(hunyuan)),
        Box::new(SessionPublisher::new(toutiao)),
        PublishLedger::open(ledger_path)?,
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("hotpress=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    info!("Hotpress starting");

    match cli.mode {
        Mode::Crawl(args) => {
            let config = Config::crawl_from_env();
            config.log_redacted();
            let mut orchestrator =
                build_orchestrator(&config, &PathBuf::from("publish_ledger.json"), Vec::new())?;
            let mut stats = RunStats::default();
            orchestrator
                .run_crawl(args.crawl_limit, &args.topics_file, &mut stats)
                .await?;
            println!("{stats}");
        }
        Mode::Publish(args) => {
            let config = Config::from_env();
            config.log_redacted();
            let cookies = load_cookies(&args.cookies)?;
            let mut orchestrator = build_orchestrator(&config, &args.ledger, cookies)?;
            let set = topics::load_filtered_topics(&args.input)?;
            let mut stats = RunStats::default();
            orchestrator
                .run_publish(&set, &args.options(), &mut stats)
                .await?;
            println!("{stats}");
            if stats.auth_aborted {
                std::process::exit(1);
            }
        }
        Mode::Full { crawl, publish } => {
            let config = Config::from_env();
            config.log_redacted();
            let cookies = load_cookies(&publish.cookies)?;
            let mut orchestrator = build_orchestrator(&config, &publish.ledger, cookies)?;
            let stats = orchestrator
                .run_full(crawl.crawl_limit, &crawl.topics_file, &publish.options())
                .await?;
            println!("{stats}");
            if stats.auth_aborted {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
