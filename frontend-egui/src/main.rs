use eframe::{egui, App};
use procmon::{ActionEngine, Settings, SignalControl, SuspendGateway};
use session::Session;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use ui::header::Header;
use ui::process_table::ProcessTable;
use ui::status_bar::StatusBar;

mod export;
mod session;
mod ui;

#[tokio::main]
async fn main() -> eframe::Result<()> {
    let (settings, config_error) = match Settings::load() {
        Ok(settings) => (settings, None),
        Err(e) => (Settings::default(), Some(e)),
    };
    init_logging(&settings.log_level);
    if let Some(e) = config_error {
        warn!(error = %e, "falling back to default settings");
    }

    // Resolved once for the lifetime of the process.
    let gateway = SuspendGateway::resolve(settings.suspend_resume);
    let engine = ActionEngine::new(
        Box::new(SignalControl::new(settings.terminate_grace())),
        gateway,
    )
    .verify_identity(settings.verify_identity);
    info!(?settings, "starting ProcMon");

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1080.0, 680.0]),
        ..Default::default()
    };
    eframe::run_native(
        "ProcMon - Process Monitor / Task Killer",
        native_options,
        Box::new(move |cc| {
            // Global black theme
            let mut visuals = egui::Visuals::dark();
            visuals.override_text_color = Some(egui::Color32::WHITE);
            visuals.panel_fill = egui::Color32::BLACK;
            visuals.window_fill = egui::Color32::BLACK;
            cc.egui_ctx.set_visuals(visuals);

            let mut style = (*cc.egui_ctx.style()).clone();
            style.spacing.item_spacing = egui::vec2(10.0, 8.0);
            style.spacing.button_padding = egui::vec2(12.0, 8.0);
            cc.egui_ctx.set_style(style);

            Box::new(ProcMonApp::new(settings, engine))
        }),
    )
}

fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

struct ProcMonApp {
    session: Session,
    process_table: ProcessTable,
}

impl ProcMonApp {
    fn new(settings: Settings, engine: ActionEngine) -> Self {
        // Load processes once at startup
        let mut session = Session::new(settings, engine);
        session.refresh();

        Self {
            session,
            process_table: ProcessTable::default(),
        }
    }
}

impl App for ProcMonApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.session.poll_action();

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            let filtered = self.session.visible().len();
            StatusBar::show(ui, &self.session, filtered);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let events = Header::show(ui, &mut self.session, &mut self.process_table);
            ui.add_space(6.0);

            if events.refresh {
                self.session.refresh();
            }
            if let Some(kind) = events.action {
                let targets = self.session.selection.clone();
                self.session.start_action(kind, targets, ctx);
            }
            if let Some(format) = events.export {
                self.session.export(format);
            }

            let rows = self.session.visible();
            let idle = !self.session.is_busy();
            let table = self
                .process_table
                .show(ui, rows, &mut self.session.selection, idle);

            if let Some((kind, pid)) = table.row_action {
                self.session.start_action(kind, [pid].into(), ctx);
            }

            if events.search_changed {
                ctx.request_repaint();
            }
        });
    }
}
