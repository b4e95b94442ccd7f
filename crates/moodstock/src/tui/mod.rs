mod app;
mod input;
mod prompt;
mod ui;

use crate::audio::Chime;
use crate::cycle::CycleConfig;
use crate::error::Result;
use crate::render::Canvas;
use crate::storage::SampleStore;

pub use app::App;

/// Run the overlay until the operator quits
pub fn run(
    store: SampleStore,
    chime: Box<dyn Chime>,
    config: CycleConfig,
    size: (u16, u16),
) -> Result<()> {
    let mut app = App::new(store, chime, config, Canvas::default(), size)?;
    app.run()
}
