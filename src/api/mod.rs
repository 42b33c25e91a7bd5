use clap::{Args, Parser, Subcommand, ValueEnum};
use reqwest::StatusCode;
use thiserror::Error;
use tracing::debug;

use crate::core::{
    CompareRequest, ComparisonSet, GoalCatalog, ScenarioKind, ScenarioParameters,
    SelectionState, SimulationRequest, SimulationResult, TwinDetail, TwinSummary,
    ValidationError, aggregate, build_compare_request, build_request, classify,
};
use crate::render::{ChartSpec, RenderPipeline, ResultsView};

const DEFAULT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ApiError {
    /// 401 from any endpoint. Non-retryable; the session must be
    /// re-established by the auth collaborator.
    #[error("session expired or unauthorized")]
    Unauthorized,
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// HTTP gateway to the catalog, twin directory, and simulation service.
/// Attaches the bearer credential when one is configured.
#[derive(Clone, Debug)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl Client {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .expect("build http client");
        Self {
            http,
            base_url,
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub async fn goal_catalog(&self) -> Result<GoalCatalog, ApiError> {
        let response = self.send(self.get("/sdgs")).await?;
        Ok(response.json().await?)
    }

    pub async fn list_twins(&self) -> Result<Vec<TwinSummary>, ApiError> {
        let response = self.send(self.get("/digital-twins")).await?;
        Ok(response.json().await?)
    }

    pub async fn twin(&self, id: u64) -> Result<TwinDetail, ApiError> {
        let response = self.send(self.get(&format!("/digital-twins/{id}"))).await?;
        Ok(response.json().await?)
    }

    pub async fn run_simulation(
        &self,
        request: &SimulationRequest,
    ) -> Result<SimulationResult, ApiError> {
        debug!(
            twin = request.digital_twin_id,
            scenario = request.scenario_type.wire_name(),
            goals = request.target_sdgs.len(),
            "running simulation"
        );
        let response = self
            .send(self.post("/simulations/run").json(request))
            .await?;
        Ok(response.json().await?)
    }

    pub async fn compare_scenarios(
        &self,
        request: &CompareRequest,
    ) -> Result<ComparisonSet, ApiError> {
        debug!(
            twin = request.digital_twin_id,
            scenarios = request.scenarios.len(),
            "comparing scenarios"
        );
        let response = self
            .send(self.post("/simulations/compare").json(request))
            .await?;
        Ok(response.json().await?)
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.authorize(self.http.get(format!("{}{path}", self.base_url)))
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.authorize(self.http.post(format!("{}{path}", self.base_url)))
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let response = builder.send().await?;
        match response.status() {
            StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized),
            status if status.is_success() => Ok(response),
            status => {
                let message = response.text().await.unwrap_or_default();
                Err(ApiError::Status {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliScenario {
    Success,
    PartialSuccess,
    Delay,
    Failure,
    Underfunded,
}

impl From<CliScenario> for ScenarioKind {
    fn from(value: CliScenario) -> Self {
        match value {
            CliScenario::Success => ScenarioKind::Success,
            CliScenario::PartialSuccess => ScenarioKind::PartialSuccess,
            CliScenario::Delay => ScenarioKind::Delay,
            CliScenario::Failure => ScenarioKind::Failure,
            CliScenario::Underfunded => ScenarioKind::Underfunded,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "twinsim",
    about = "Client for the SDG digital-twin future-impact simulation platform"
)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        default_value = "http://localhost:8000",
        env = "TWINSIM_API_BASE"
    )]
    pub api_base: String,
    /// Bearer token attached to every request.
    #[arg(long, global = true, env = "TWINSIM_TOKEN")]
    pub token: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the SDG goal catalog
    Goals,
    /// List available digital twins
    Twins,
    /// Run one simulation scenario against a twin
    Run(RunArgs),
    /// Run every scenario kind and compare them side by side
    Compare(CompareArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Digital twin to simulate against
    #[arg(long)]
    twin: u64,
    /// Target SDG goal number; repeat for multiple goals
    #[arg(long = "goal", required = true)]
    goals: Vec<u32>,
    /// Optional project providing the intervention context
    #[arg(long)]
    project: Option<u64>,
    #[arg(long, value_enum, default_value_t = CliScenario::Success)]
    scenario: CliScenario,
    #[arg(long, default_value_t = 100.0, help = "Funding level in percent")]
    funding: f64,
    #[arg(long, default_value_t = 5, help = "Projection horizon in years")]
    timeline: u32,
    #[arg(long, default_value_t = 0, help = "Project start delay in months")]
    delay: u32,
    #[arg(long, default_value_t = 1.0, help = "Intervention scale factor")]
    scale: f64,
}

#[derive(Args, Debug)]
pub struct CompareArgs {
    #[arg(long)]
    twin: u64,
    #[arg(long = "goal", required = true)]
    goals: Vec<u32>,
    #[arg(long, default_value_t = 100.0, help = "Funding level in percent")]
    funding: f64,
    #[arg(long, default_value_t = 5, help = "Projection horizon in years")]
    timeline: u32,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("goal {0} is not in the catalog (expected 1..=17)")]
    UnknownGoal(u32),
    #[error("{0}")]
    InvalidArgument(String),
}

pub async fn run(cli: Cli) -> Result<(), CliError> {
    let mut client = Client::new(cli.api_base.as_str());
    if let Some(token) = &cli.token {
        client = client.with_token(token);
    }

    match cli.command {
        Command::Goals => print_goals(&client).await,
        Command::Twins => print_twins(&client).await,
        Command::Run(args) => run_single(&client, args).await,
        Command::Compare(args) => run_compare(&client, args).await,
    }
}

async fn print_goals(client: &Client) -> Result<(), CliError> {
    let catalog = client.goal_catalog().await?;
    for (number, name) in &catalog.goals {
        println!("SDG {number:>2}  {name}");
    }
    Ok(())
}

async fn print_twins(client: &Client) -> Result<(), CliError> {
    let twins = client.list_twins().await?;
    if twins.is_empty() {
        println!("No digital twins available.");
        return Ok(());
    }
    for twin in &twins {
        println!(
            "{:>4}  {} ({}, {}) - population {}, {} km2",
            twin.id,
            twin.name,
            twin.region,
            twin.country,
            crate::render::group_thousands(twin.population),
            twin.area_km2
        );
    }
    Ok(())
}

fn validate_run_args(funding: f64, timeline: u32, scale: f64) -> Result<(), CliError> {
    if !funding.is_finite() || funding < 0.0 {
        return Err(CliError::InvalidArgument(
            "--funding must be >= 0".to_string(),
        ));
    }
    if timeline == 0 {
        return Err(CliError::InvalidArgument(
            "--timeline must be > 0".to_string(),
        ));
    }
    if !scale.is_finite() || scale <= 0.0 {
        return Err(CliError::InvalidArgument("--scale must be > 0".to_string()));
    }
    Ok(())
}

async fn select_for_simulation(
    client: &Client,
    twin_id: u64,
    goals: &[u32],
) -> Result<SelectionState, CliError> {
    let catalog = client.goal_catalog().await?;
    let detail = client.twin(twin_id).await?;

    let mut selection = SelectionState::new();
    selection.select_twin(detail.twin);
    for &goal in goals {
        if !catalog.contains(goal) {
            return Err(CliError::UnknownGoal(goal));
        }
        if !selection.is_goal_selected(goal) {
            selection.toggle_goal(goal);
        }
    }
    Ok(selection)
}

async fn run_single(client: &Client, args: RunArgs) -> Result<(), CliError> {
    validate_run_args(args.funding, args.timeline, args.scale)?;

    let mut selection = select_for_simulation(client, args.twin, &args.goals).await?;
    selection.select_project(args.project);
    let twin_name = selection
        .twin()
        .map(|t| t.name.clone())
        .unwrap_or_default();

    let params = ScenarioParameters {
        scenario: args.scenario.into(),
        funding_percentage: args.funding,
        timeline_years: args.timeline,
        delay_months: args.delay,
        scale_factor: args.scale,
    };
    let request = build_request(&selection, &params)?;

    let mut pipeline = RenderPipeline::new();
    let ticket = pipeline.begin_request();
    match client.run_simulation(&request).await {
        Ok(result) => {
            let classified = classify(&result);
            pipeline.commit_single(ticket, &classified, &twin_name);
            print_view(&pipeline);
            print_charts(pipeline.take_chart_jobs());
            Ok(())
        }
        Err(e) => {
            pipeline.fail(ticket, "Simulation Error", &e.to_string());
            print_error(&pipeline);
            Err(e.into())
        }
    }
}

async fn run_compare(client: &Client, args: CompareArgs) -> Result<(), CliError> {
    validate_run_args(args.funding, args.timeline, 1.0)?;

    let selection = select_for_simulation(client, args.twin, &args.goals).await?;
    let twin_name = selection
        .twin()
        .map(|t| t.name.clone())
        .unwrap_or_default();

    let params = ScenarioParameters {
        funding_percentage: args.funding,
        timeline_years: args.timeline,
        ..ScenarioParameters::default()
    };
    let request = build_compare_request(&selection, &params)?;

    let mut pipeline = RenderPipeline::new();
    let ticket = pipeline.begin_request();
    match client.compare_scenarios(&request).await {
        Ok(set) => {
            let summaries = aggregate(&set);
            pipeline.commit_comparison(ticket, &summaries, &twin_name, params.timeline_years);
            print_view(&pipeline);
            Ok(())
        }
        Err(e) => {
            pipeline.fail(ticket, "Comparison Error", &e.to_string());
            print_error(&pipeline);
            Err(e.into())
        }
    }
}

fn print_view(pipeline: &RenderPipeline) {
    match pipeline.view() {
        Some(ResultsView::Single(view)) => {
            println!("{}", view.title);
            println!("{}", view.subtitle);
            println!();
            for stat in &view.stats {
                println!("  {:>12}  {}", stat.value, stat.label);
            }
            println!();
            println!("Impact Explanation: {}", view.explanation);
            println!("Policy Insight: {}", view.policy_insight);
            if let Some(warning) = &view.risk_warning {
                println!("Risk Warning: {warning}");
            }
            println!();
            println!("Primary SDG Impacts");
            for card in &view.primary_cards {
                println!("  {}", card.title);
                println!("    {}", card.change_badge);
                println!("    {}  |  {}", card.baseline_line, card.final_line);
            }
            if !view.secondary_cards.is_empty() {
                println!();
                println!("Secondary SDG Effects (Ripple Impact)");
                for card in &view.secondary_cards {
                    println!("  {}", card.title);
                    println!("    {}", card.change_badge);
                }
            }
        }
        Some(ResultsView::Comparison(view)) => {
            println!("{}", view.title);
            println!("{}", view.subtitle);
            println!();
            for card in &view.cards {
                println!("{}", card.heading);
                println!("  People Affected: {}", card.affected_population);
                println!("  Avg SDG Change:  {}", card.mean_change);
                println!("  Confidence:      {}", card.confidence);
            }
        }
        None => {}
    }
}

fn print_charts(jobs: Vec<ChartSpec>) {
    for job in jobs {
        println!();
        println!("SDG {} timeline - {}", job.goal_number, job.series_label);
        for (label, value) in job.labels.iter().zip(job.values.iter()) {
            println!("  {label:>8}  {value:.2}");
        }
    }
}

fn print_error(pipeline: &RenderPipeline) {
    if let Some(panel) = pipeline.error() {
        eprintln!("{}: {}", panel.title, panel.message);
    }
}
