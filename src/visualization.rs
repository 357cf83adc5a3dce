pub mod colormap;
pub mod scene;

#[cfg(feature = "visualization")]
pub mod plot_window;

pub use scene::{analysis_figure, spectrogram_figure, DrawList, Figure};

#[cfg(feature = "visualization")]
pub use plot_window::{DisplayEvent, PlotWindow};
