use anyhow::{Context, Result, bail};
use percept_core::{IllusionType, Phase, ResponseCapture, SessionPhase};
use percept_experiment::{
    BlockOutcome, Manifest, Session, SessionConfig, SimulatedParticipant, TrialStore,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

use crate::cli::Commands;

/// One recorded trial: the manifest stimulus it showed plus the raw capture
#[derive(Debug, Deserialize)]
struct ReplayTrial {
    stimulus: String,
    #[serde(flatten)]
    capture: ResponseCapture,
}

pub struct App {
    config: SessionConfig,
}

impl App {
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => SessionConfig::from_path(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => SessionConfig::default(),
        };
        Ok(Self { config })
    }

    pub fn run(self, command: Commands) -> Result<()> {
        match command {
            Commands::Replay {
                manifest,
                captures,
                phase,
                out,
            } => self.replay(&manifest, &captures, phase, out.as_deref()),
            Commands::Simulate {
                manifest,
                phase,
                seed,
                accuracy,
                mean_rt,
                pointer_rate,
                out,
            } => {
                let rng = match seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_os_rng(),
                };
                let manifest = load_manifest(&manifest, phase)?;
                let participant =
                    SimulatedParticipant::new(&self.config, rng, accuracy, mean_rt)
                        .and_then(|p| p.with_pointer_rate(pointer_rate))
                        .context("invalid simulation parameters")?;
                self.simulate(&manifest, participant, out.as_deref())
            }
        }
    }

    fn replay(
        self,
        manifest_path: &Path,
        captures_path: &Path,
        phase: SessionPhase,
        out: Option<&Path>,
    ) -> Result<()> {
        let manifest = load_manifest(manifest_path, phase)?;
        let src = std::fs::read_to_string(captures_path)
            .with_context(|| format!("reading captures {}", captures_path.display()))?;
        let trials: Vec<ReplayTrial> = serde_json::from_str(&src)
            .with_context(|| format!("parsing captures {}", captures_path.display()))?;
        if trials.is_empty() {
            bail!("{} contains no trials", captures_path.display());
        }

        println!("=== REPLAY: {} trials, phase {:?} ===", trials.len(), phase);
        let mut session = Session::new(self.config).starting_at(phase);

        for (i, trial) in trials.iter().enumerate() {
            let spec = manifest.find(&trial.stimulus).with_context(|| {
                format!("trial {}: stimulus {} not in manifest", i + 1, trial.stimulus)
            })?;

            if session.current_block() != Some(spec.illusion) {
                if let Some(open) = session.current_block() {
                    close_block(&mut session, open)?;
                }
                session.begin_block(spec.illusion)?;
            }
            session
                .complete_trial(spec, &trial.capture)
                .with_context(|| format!("trial {} ({})", i + 1, trial.stimulus))?;
        }

        finish(session, out)
    }

    fn simulate(
        self,
        manifest: &Manifest,
        mut participant: SimulatedParticipant<StdRng>,
        out: Option<&Path>,
    ) -> Result<()> {
        let phase = manifest.phase;
        println!(
            "=== SIMULATION: {} trials, phase {:?}, accuracy {:.2}, mean RT {:.0} ms ===",
            manifest.len(),
            phase,
            participant.accuracy,
            participant.mean_rt_ms
        );
        let mut session = Session::new(self.config).starting_at(phase);

        for illusion in manifest.illusion_types() {
            let mut block: Vec<_> = manifest.by_illusion(illusion).collect();
            block.shuffle(&mut participant.rng);

            session.begin_block(illusion)?;
            for spec in block {
                let capture = participant.respond(spec);
                session.complete_trial(spec, &capture)?;
            }
            let outcome = session.complete_block()?;
            print_outcome(&outcome);
        }
        info!(elapsed_ms = participant.clock_ms(), "simulated session finished");

        finish(session, out)
    }
}

fn load_manifest(path: &Path, phase: SessionPhase) -> Result<Manifest> {
    let manifest = Manifest::from_path(path, phase)
        .with_context(|| format!("loading manifest {}", path.display()))?;
    info!(
        trials = manifest.len(),
        illusions = ?manifest.illusion_types(),
        "manifest loaded"
    );
    Ok(manifest)
}

fn finish(mut session: Session, out: Option<&Path>) -> Result<()> {
    if let Some(illusion) = session.current_block() {
        close_block(&mut session, illusion)?;
    }

    if session.phase.is_scored() {
        let (_, debrief) = session.final_debrief()?;
        println!("\n--- Final results ---");
        println!("{debrief}");
    }

    if let Some(path) = out {
        write_records(&session.store, path)?;
    }
    Ok(())
}

fn close_block(session: &mut Session, illusion: IllusionType) -> Result<()> {
    let outcome = session
        .complete_block()
        .with_context(|| format!("closing {illusion} block"))?;
    print_outcome(&outcome);
    Ok(())
}

fn print_outcome(outcome: &BlockOutcome) {
    println!(
        "\n--- Block {} ({}, {:?}) ---",
        outcome.block_number, outcome.illusion, outcome.phase
    );
    match &outcome.debrief {
        Some(debrief) => println!("{debrief}"),
        None if outcome.phase.is_training() => println!("Great job!"),
        None => {
            println!("Can you do better in the next round?");
            println!(
                "Remember, your goal is still to be as fast and accurate as possible."
            );
        }
    }
}

fn write_records(store: &TrialStore, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(file, store).context("writing trial records")?;
    println!("\nResults saved to {}", path.display());
    Ok(())
}
