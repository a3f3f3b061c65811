use anyhow::Context;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use clap::Parser;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use microscope::advisory::OPTIMAL_CONDENSER_NA;
use microscope::path::{optical_path, Stage};
use microscope::presets::{
    ObjectiveInfo, CONDENSER_NA_PRESETS, WAVELENGTH_RANGE_NM, WAVELENGTH_STEP_NM,
};
use microscope::{
    catalog, GatingPolicy, InstrumentConfig, MethodFactorPolicy, ModelSettings, ObjectivePreset,
    Observation, ObservationMethod, OpticalModel, OpticsError,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Interactive microscope optical path in the browser")]
struct Args {
    #[arg(short = 'p', long, default_value = "3000", help = "HTTP server port")]
    port: u16,

    #[arg(
        short = 'b',
        long,
        default_value = "127.0.0.1",
        help = "HTTP server bind address",
        long_help = "IP address to bind the HTTP server to. Use '0.0.0.0' to listen on all \
            interfaces, or '127.0.0.1' for localhost-only access."
    )]
    bind_address: String,

    #[arg(
        long,
        default_value = "halved",
        help = "Method factor policy: 'halved' or 'uniform'",
        long_help = "How the observation method scales the Abbe limit. 'halved' divides the \
            resolvable distance by two under fluorescence; 'uniform' applies 0.61*λ/NA to \
            every method."
    )]
    method_factor: MethodFactorPolicy,

    #[arg(
        long,
        default_value = "method-gated",
        help = "Structure gating policy: 'method-gated' or 'size-only'",
        long_help = "Whether viruses and ribosomes additionally require fluorescence to be \
            listed ('method-gated') or are decided by size alone ('size-only')."
    )]
    gating: GatingPolicy,
}

#[derive(Debug, Default, Deserialize)]
struct EvaluateQuery {
    wavelength: Option<f64>,
    magnification: Option<u32>,
    na: Option<f64>,
    condenser: Option<f64>,
    method: Option<String>,
}

#[derive(Serialize)]
struct EvaluateResponse {
    config: InstrumentConfig,
    settings: ModelSettings,
    observation: Observation,
    stages: Vec<Stage>,
    condenser_message: &'static str,
    tip_message: &'static str,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Serialize)]
struct MethodInfo {
    id: &'static str,
    name: &'static str,
    description: &'static str,
}

#[derive(Serialize)]
struct PresetsResponse {
    objectives: Vec<ObjectiveInfo>,
    condenser_na: Vec<f64>,
    optimal_condenser_na: f64,
    wavelength_min: f64,
    wavelength_max: f64,
    wavelength_step: f64,
    methods: Vec<MethodInfo>,
}

/// Build the instrument a query describes. Without `na` the magnification must
/// name a preset objective; with `na` any positive pair is taken as given.
fn config_from_query(q: &EvaluateQuery) -> Result<InstrumentConfig, OpticsError> {
    let defaults = InstrumentConfig::default();
    let magnification = q.magnification.unwrap_or(defaults.objective_magnification);
    let method = match q.method.as_deref() {
        Some(name) => name.parse::<ObservationMethod>()?,
        None => defaults.method,
    };

    let mut config = match q.na {
        Some(na) => InstrumentConfig {
            objective_magnification: magnification,
            immersion: magnification == 100,
            ..defaults
        }
        .with_objective_na(na),
        None => defaults.with_objective(ObjectivePreset::from_magnification(magnification)?),
    };
    config = config
        .with_wavelength(q.wavelength.unwrap_or(defaults.wavelength_nm))
        .with_condenser_na(q.condenser.unwrap_or(defaults.condenser_na))
        .with_method(method);
    Ok(config)
}

fn evaluate_query(model: &OpticalModel, q: &EvaluateQuery) -> Result<EvaluateResponse, OpticsError> {
    let config = config_from_query(q)?;
    let observation = model.evaluate(&config)?;
    let stages = optical_path(&config, &observation);
    Ok(EvaluateResponse {
        config,
        settings: model.settings(),
        condenser_message: observation.condenser.message(),
        tip_message: observation.tip.message(),
        observation,
        stages,
    })
}

fn presets() -> PresetsResponse {
    PresetsResponse {
        objectives: ObjectivePreset::ALL.iter().map(|&p| p.into()).collect(),
        condenser_na: CONDENSER_NA_PRESETS.to_vec(),
        optimal_condenser_na: OPTIMAL_CONDENSER_NA,
        wavelength_min: *WAVELENGTH_RANGE_NM.start(),
        wavelength_max: *WAVELENGTH_RANGE_NM.end(),
        wavelength_step: WAVELENGTH_STEP_NM,
        methods: ObservationMethod::ALL
            .iter()
            .map(|&m| MethodInfo {
                id: m.as_str(),
                name: m.display_name(),
                description: m.description(),
            })
            .collect(),
    }
}

const INDEX_HTML: &str = r##"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>Microscope Optical Path</title>
    <style>
      html, body { margin: 0; padding: 0; min-height: 100%; background: #0b0c10; color: #e6e6e6; font-family: "Segoe UI", sans-serif; }
      h1 { text-align: center; font-size: 32px; margin: 28px 0 4px; color: #c4b5fd; }
      .sub { text-align: center; color: #9aa3ad; margin-bottom: 24px; }
      #panel { max-width: 1180px; margin: 0 auto; display: grid; grid-template-columns: repeat(4, 1fr); gap: 12px; padding: 0 16px; }
      .control { background: rgba(10,12,16,0.9); border: 1px solid #2a2f36; border-radius: 10px; padding: 12px; }
      .control label { display: block; font-size: 11px; text-transform: uppercase; letter-spacing: 0.12em; color: #9aa3ad; margin-bottom: 6px; }
      select, input[type="range"] { width: 100%; background: #0f141b; color: #e6e6e6; border: 1px solid #2a2f36; border-radius: 6px; padding: 4px 6px; }
      .hint { font-size: 11px; color: #7f8895; margin-top: 6px; }
      #path { max-width: 1180px; margin: 24px auto; display: flex; align-items: stretch; gap: 6px; padding: 0 16px; }
      .stage { flex: 1; border-radius: 14px; padding: 12px 8px; text-align: center; background: #11151b; border: 2px solid #2a2f36; }
      .stage .label { font-weight: 600; font-size: 13px; }
      .stage .caption { font-size: 12px; color: #9aa3ad; margin-top: 4px; }
      .arrow { align-self: center; color: #64748b; font-size: 18px; }
      #stats { max-width: 1180px; margin: 0 auto; display: grid; grid-template-columns: repeat(3, 1fr); gap: 12px; padding: 0 16px; }
      .stat { background: #11151b; border: 1px solid #2a2f36; border-radius: 10px; padding: 12px; }
      .stat .name { font-size: 12px; color: #9aa3ad; }
      .stat .value { font-size: 26px; font-weight: 700; color: #c4b5fd; }
      #structures { max-width: 1180px; margin: 16px auto; padding: 0 16px; display: grid; grid-template-columns: repeat(4, 1fr); gap: 8px; }
      .structure { background: #0f141b; border: 1px solid #1f2630; border-radius: 8px; padding: 8px; font-size: 13px; }
      .structure .size { font-size: 11px; color: #9aa3ad; }
      #tip { max-width: 1148px; margin: 16px auto 32px; padding: 14px; border: 1px solid #4c1d95; border-radius: 10px; background: #1e1533; font-size: 13px; }
      #error { color: #f87171; text-align: center; min-height: 18px; }
    </style>
  </head>
  <body>
    <h1>Microscope Optical Path</h1>
    <div class="sub">Each control changes one stage of the light path; resolution and visible structures update immediately.</div>

    <div id="panel">
      <div class="control">
        <label>Wavelength <span id="wlVal"></span></label>
        <input id="wavelength" type="range" min="{{WL_MIN}}" max="{{WL_MAX}}" step="{{WL_STEP}}" value="550" />
        <div class="hint">Violet ({{WL_MIN}}) to red ({{WL_MAX}})</div>
      </div>
      <div class="control">
        <label>Condenser NA</label>
        <select id="condenser">{{CONDENSER_OPTIONS}}</select>
        <div class="hint" id="condenserHint"></div>
      </div>
      <div class="control">
        <label>Objective</label>
        <select id="objective">{{OBJECTIVE_OPTIONS}}</select>
        <div class="hint" id="objectiveHint"></div>
      </div>
      <div class="control">
        <label>Method</label>
        <select id="method">{{METHOD_OPTIONS}}</select>
      </div>
    </div>

    <div id="path"></div>
    <div id="error"></div>

    <div id="stats">
      <div class="stat"><div class="name">Resolution</div><div class="value" id="resolution">-</div></div>
      <div class="stat"><div class="name">Magnification</div><div class="value" id="magnification">-</div></div>
      <div class="stat"><div class="name">Visible structures</div><div class="value" id="count">-</div></div>
    </div>

    <div id="structures"></div>
    <div id="tip"></div>

    <script>
      const el = (id) => document.getElementById(id);

      function query() {
        const params = new URLSearchParams({
          wavelength: el("wavelength").value,
          magnification: el("objective").value,
          condenser: el("condenser").value,
          method: el("method").value,
        });
        return "/api/evaluate?" + params.toString();
      }

      function render(data) {
        const obs = data.observation;
        el("wlVal").textContent = data.config.wavelength_nm + " nm";
        el("wlVal").style.color = obs.light_color;
        el("condenserHint").textContent = data.condenser_message;
        el("objectiveHint").textContent = "NA " + data.config.objective_na + (data.config.immersion ? " · oil immersion" : " · dry");

        el("path").innerHTML = data.stages.map((s, i) => {
          const color = s.id === "light" ? obs.light_color : "#2a2f36";
          const arrow = i + 1 < data.stages.length ? '<div class="arrow">→</div>' : "";
          return `<div class="stage" style="border-color:${color}"><div class="label">${s.label}</div><div class="caption">${s.subtitle}</div></div>${arrow}`;
        }).join("");

        el("resolution").textContent = obs.resolution_nm.toFixed(0) + " nm";
        el("magnification").textContent = obs.total_magnification + "x";
        el("count").textContent = obs.visible.length;
        el("structures").innerHTML = obs.visible.map((s) =>
          `<div class="structure">${s.symbol} ${s.name}<div class="size">Size: ${s.min_size_nm} nm · ${s.category}</div></div>`
        ).join("");
        el("tip").textContent = data.tip_message;
      }

      async function refresh() {
        try {
          const res = await fetch(query());
          const data = await res.json();
          if (!res.ok) {
            el("error").textContent = data.error;
            return;
          }
          el("error").textContent = "";
          render(data);
        } catch (err) {
          el("error").textContent = String(err);
        }
      }

      for (const id of ["wavelength", "condenser", "objective", "method"]) {
        el(id).addEventListener("input", refresh);
      }
      refresh();
    </script>
  </body>
</html>
"##;

fn option(value: impl std::fmt::Display, label: impl std::fmt::Display, selected: bool) -> String {
    let selected = if selected { " selected" } else { "" };
    format!(r#"<option value="{value}"{selected}>{label}</option>"#)
}

static INDEX_PAGE: Lazy<String> = Lazy::new(|| {
    let defaults = InstrumentConfig::default();
    let objectives: String = ObjectivePreset::ALL
        .iter()
        .map(|p| {
            option(
                p.magnification(),
                format!("{}x", p.magnification()),
                p.magnification() == defaults.objective_magnification,
            )
        })
        .collect();
    let condensers: String = CONDENSER_NA_PRESETS
        .iter()
        .map(|&na| option(na, na, na == defaults.condenser_na))
        .collect();
    let methods: String = ObservationMethod::ALL
        .iter()
        .map(|&m| {
            option(
                m.as_str(),
                format!("{} ({})", m.display_name(), m.description()),
                m == defaults.method,
            )
        })
        .collect();

    INDEX_HTML
        .replace("{{WL_MIN}}", &WAVELENGTH_RANGE_NM.start().to_string())
        .replace("{{WL_MAX}}", &WAVELENGTH_RANGE_NM.end().to_string())
        .replace("{{WL_STEP}}", &WAVELENGTH_STEP_NM.to_string())
        .replace("{{OBJECTIVE_OPTIONS}}", &objectives)
        .replace("{{CONDENSER_OPTIONS}}", &condensers)
        .replace("{{METHOD_OPTIONS}}", &methods)
});

async fn index() -> impl IntoResponse {
    Html(INDEX_PAGE.as_str())
}

async fn evaluate(
    State(model): State<OpticalModel>,
    Query(q): Query<EvaluateQuery>,
) -> impl IntoResponse {
    match evaluate_query(&model, &q) {
        Ok(out) => Json(out).into_response(),
        Err(e) => {
            warn!(error = %e, ?q, "rejected evaluate request");
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

async fn structure_catalog() -> impl IntoResponse {
    Json(catalog())
}

async fn preset_table() -> impl IntoResponse {
    Json(presets())
}

fn router(model: OpticalModel) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/evaluate", get(evaluate))
        .route("/api/catalog", get(structure_catalog))
        .route("/api/presets", get(preset_table))
        .with_state(model)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    microscope::init_logging();
    let args = Args::parse();

    let settings = ModelSettings {
        method_factor: args.method_factor,
        gating: args.gating,
    };
    info!(
        method_factor = settings.method_factor.as_str(),
        gating = settings.gating.as_str(),
        "optical model configured"
    );

    let listener = tokio::net::TcpListener::bind((args.bind_address.as_str(), args.port))
        .await
        .with_context(|| format!("failed to bind {}:{}", args.bind_address, args.port))?;
    info!("Serving on http://{}", listener.local_addr()?);
    axum::serve(listener, router(OpticalModel::new(settings))).await?;
    Ok(())
}
