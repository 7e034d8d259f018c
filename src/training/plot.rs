/// Accuracy-vs-epoch plot rendering
use std::path::Path;

use plotters::prelude::*;

use super::metrics::EpochRecord;

fn plot_err(err: impl std::fmt::Display) -> crate::TextClsError {
    crate::TextClsError::Plot(err.to_string())
}

/// Render the test-accuracy curve to a PNG file
///
/// An empty history renders nothing and succeeds (a zero-epoch run has
/// no curve to draw).
pub fn render_accuracy_plot(history: &[EpochRecord], path: &Path) -> crate::Result<()> {
    if history.is_empty() {
        log::warn!("no epochs recorded, skipping accuracy plot");
        return Ok(());
    }

    let x_max = history
        .iter()
        .map(|record| record.epoch)
        .max()
        .unwrap_or(0)
        .max(1) as f64;

    let root = BitMapBackend::new(path, (800, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("test accuracy", ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..x_max, 0f64..1f64)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_desc("epoch")
        .y_desc("accuracy")
        .draw()
        .map_err(plot_err)?;

    chart
        .draw_series(LineSeries::new(
            history
                .iter()
                .map(|record| (record.epoch as f64, record.test_acc)),
            &BLUE,
        ))
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn record(epoch: usize, test_acc: f64) -> EpochRecord {
        EpochRecord {
            epoch,
            train_loss: 0.5,
            train_acc: 0.5,
            test_loss: 0.5,
            test_acc,
        }
    }

    #[test]
    fn test_render_writes_png() -> crate::Result<()> {
        let history = vec![record(0, 0.4), record(1, 0.6), record(2, 0.7)];
        let path = std::env::temp_dir().join("textcls_plot_test.png");

        render_accuracy_plot(&history, &path)?;

        let written = fs::metadata(&path)?.len();
        assert!(written > 0);

        fs::remove_file(&path).ok();
        Ok(())
    }

    #[test]
    fn test_empty_history_skips_rendering() -> crate::Result<()> {
        let path = std::env::temp_dir().join("textcls_plot_empty_test.png");
        render_accuracy_plot(&[], &path)?;
        assert!(!path.exists());
        Ok(())
    }
}
