//! Self-contained HTML evaluation report

use super::RegressionMetrics;
use ndarray::Array1;

const PLOT_SIZE: f64 = 520.0;
const PLOT_MARGIN: f64 = 40.0;

/// Render an HTML report with metric cards and an actual-vs-predicted
/// scatter plot (inline SVG, no external assets).
pub fn render_report(
    y_true: &Array1<f64>,
    y_pred: &Array1<f64>,
    metrics: &RegressionMetrics,
) -> String {
    let scatter = render_scatter(y_true, y_pred);

    format!(
        r#"<html>
<head>
<style>
    body {{
        font-family: Arial, sans-serif;
        background-color: #f9f9f9;
        padding: 30px;
    }}
    h1 {{
        text-align: center;
        color: #333;
    }}
    .metrics-grid {{
        display: grid;
        grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
        gap: 20px;
        margin: 30px 0;
    }}
    .card {{
        background-color: white;
        border-radius: 12px;
        padding: 20px;
        box-shadow: 0 2px 10px rgba(0,0,0,0.1);
        text-align: center;
        font-size: 18px;
    }}
    .card h2 {{
        font-size: 24px;
        color: #2c3e50;
    }}
    .plot-section {{
        margin-top: 40px;
        text-align: center;
    }}
</style>
</head>
<body>
    <h1>Delivery Duration Model Evaluation</h1>

    <div class="metrics-grid">
        <div class="card">
            <h2>RMSE</h2>
            <p>{rmse:.2}</p>
        </div>
        <div class="card">
            <h2>MAE</h2>
            <p>{mae:.2}</p>
        </div>
        <div class="card">
            <h2>R&#178; Score</h2>
            <p>{r2:.4}</p>
        </div>
    </div>

    <div class="plot-section">
        <h2>Actual vs Predicted</h2>
        {scatter}
    </div>
</body>
</html>
"#,
        rmse = metrics.rmse,
        mae = metrics.mae,
        r2 = metrics.r2,
        scatter = scatter,
    )
}

fn render_scatter(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> String {
    let lo = y_true
        .iter()
        .chain(y_pred.iter())
        .copied()
        .fold(f64::INFINITY, f64::min);
    let hi = y_true
        .iter()
        .chain(y_pred.iter())
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    let range = if hi > lo { hi - lo } else { 1.0 };

    let scale = |v: f64| PLOT_MARGIN + (v - lo) / range * (PLOT_SIZE - 2.0 * PLOT_MARGIN);
    // SVG y axis grows downward
    let flip = |v: f64| PLOT_SIZE - v;

    let mut svg = String::new();
    svg.push_str(&format!(
        r#"<svg width="{s}" height="{s}" viewBox="0 0 {s} {s}" xmlns="http://www.w3.org/2000/svg">"#,
        s = PLOT_SIZE
    ));
    svg.push_str(&format!(
        r##"<rect width="{s}" height="{s}" fill="white" stroke="#ccc"/>"##,
        s = PLOT_SIZE
    ));

    // identity line: perfect prediction
    svg.push_str(&format!(
        r#"<line x1="{x1}" y1="{y1}" x2="{x2}" y2="{y2}" stroke="green" stroke-width="1.5"/>"#,
        x1 = scale(lo),
        y1 = flip(scale(lo)),
        x2 = scale(hi),
        y2 = flip(scale(hi)),
    ));

    for (t, p) in y_true.iter().zip(y_pred.iter()) {
        svg.push_str(&format!(
            r##"<circle cx="{cx:.1}" cy="{cy:.1}" r="3" fill="#1f77b4" fill-opacity="0.6"/>"##,
            cx = scale(*t),
            cy = flip(scale(*p)),
        ));
    }

    svg.push_str(&format!(
        r##"<text x="{x}" y="{y}" font-size="12" fill="#555">Actual Duration</text>"##,
        x = PLOT_SIZE / 2.0 - 45.0,
        y = PLOT_SIZE - 8.0,
    ));
    svg.push_str(&format!(
        r##"<text x="12" y="{y}" font-size="12" fill="#555" transform="rotate(-90 12 {y})">Predicted Duration</text>"##,
        y = PLOT_SIZE / 2.0 + 45.0,
    ));
    svg.push_str("</svg>");
    svg
}
