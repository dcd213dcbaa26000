//! HTML rendering of a [`ReportModel`].
//!
//! The page is a minijinja template fed with the serialized model. The
//! template name ends in `.html`, which turns on HTML autoescaping for every
//! interpolated value; the chart payload goes through `tojson`. Figures are
//! produced by [`super::format`] and are emitted unescaped so the `N/A`
//! sentinel stays literal.

use minijinja::{context, Environment};

use super::ReportModel;
use crate::error::ReportError;

const TEMPLATE_NAME: &str = "report.html";

/// Render the standalone report page.
pub fn render_html(model: &ReportModel) -> Result<String, ReportError> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.add_template(TEMPLATE_NAME, REPORT_TEMPLATE)?;

    let template = env.get_template(TEMPLATE_NAME)?;
    let html = template.render(context! {
        report => model,
        chart => &model.chart,
    })?;
    Ok(html)
}

const REPORT_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{{ report.title }}</title>
<script src="https://cdn.jsdelivr.net/npm/chart.js"></script>
<style>
  *, *::before, *::after { box-sizing: border-box; }
  body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
    margin: 0; padding: 2rem;
    background: #0b0f1a; color: #e2e8f0; line-height: 1.5;
  }
  .container { max-width: 80rem; margin: 0 auto; }
  header { text-align: center; margin-bottom: 3rem; }
  h1 { font-size: 2.5rem; font-weight: 800; margin: 0 0 0.5rem; }
  h2 { font-size: 1.125rem; font-weight: 600; margin: 0 0 1rem; }
  .subtitle { color: #94a3b8; font-size: 1.125rem; }
  .generated {
    display: inline-block; margin-top: 1rem; padding: 0.25rem 1rem;
    border-radius: 9999px; border: 1px solid #1e3a8a; color: #60a5fa; font-size: 0.875rem;
  }
  .cards {
    display: grid; grid-template-columns: repeat(auto-fit, minmax(18rem, 1fr));
    gap: 1.5rem; margin-bottom: 3rem;
  }
  .panel {
    background: #111827; border: 1px solid #1f2937; border-radius: 1rem; padding: 1.5rem;
  }
  .card-head { display: flex; justify-content: space-between; align-items: flex-start; }
  .runtime { font-size: 1.25rem; font-weight: 700; text-transform: uppercase; letter-spacing: 0.05em; margin: 0; }
  .badges { display: flex; flex-direction: column; align-items: flex-end; gap: 0.25rem; }
  .badge {
    font-size: 0.625rem; font-weight: 700; text-transform: uppercase;
    padding: 0.125rem 0.5rem; border-radius: 0.25rem;
  }
  .badge.fastest { color: #eab308; border: 1px solid #713f12; }
  .badge.most_efficient { color: #3b82f6; border: 1px solid #1e3a8a; }
  .source { font-size: 0.625rem; color: #4b5563; font-family: monospace; }
  .label { font-size: 0.75rem; text-transform: uppercase; font-weight: 600; color: #64748b; margin: 1rem 0 0; }
  .value { font-size: 1.875rem; font-weight: 700; margin: 0; }
  .value.small { font-size: 1.25rem; font-weight: 500; }
  .unit { font-size: 0.875rem; font-weight: 400; color: #64748b; }
  .split { display: grid; grid-template-columns: 1fr 1fr; gap: 1rem; border-top: 1px solid #1f2937; margin-top: 1rem; }
  .ok { color: #4ade80; }
  .bad { color: #f87171; }
  .charts { display: grid; grid-template-columns: repeat(auto-fit, minmax(28rem, 1fr)); gap: 2rem; margin-bottom: 3rem; }
  .chart-container { position: relative; height: 300px; width: 100%; }
  table { width: 100%; border-collapse: collapse; }
  th, td { padding: 1rem 1.5rem; border-top: 1px solid #1f2937; }
  th { font-size: 0.75rem; text-transform: uppercase; letter-spacing: 0.1em; color: #9ca3af; text-align: left; }
  th.num, td.num { text-align: right; }
  td.num span { font-family: monospace; font-size: 1.25rem; }
  .desc { font-size: 0.75rem; color: #64748b; margin: 0; }
  .workload { font-weight: 700; margin: 0; }
  footer { text-align: center; color: #64748b; font-size: 0.875rem; margin-top: 3rem; }
</style>
</head>
<body>
<div class="container">
<header>
  <h1>{{ report.title }}</h1>
  <p class="subtitle">{{ report.subtitle }}</p>
  <div class="generated">Generated on {{ report.generated_at }}</div>
</header>

<section class="cards">
{% for card in report.runtimes %}
  <div class="panel card" id="card-{{ card.label }}">
    <div class="card-head">
      <h3 class="runtime" style="color: {{ card.color }}">{{ card.label }}</h3>
      <div class="badges">
        {% if "fastest" in card.badges %}
        <span class="badge fastest">Fastest</span>
        {% endif %}
        {% if "most_efficient" in card.badges %}
        <span class="badge most_efficient">Most Efficient</span>
        {% endif %}
        <span class="source" title="{{ card.captured_at }}">{{ card.source }}</span>
      </div>
    </div>
    <p class="label">Max Throughput</p>
    <p class="value">{{ card.throughput|safe }} <span class="unit">req/s</span></p>
    <div class="split">
      <div>
        <p class="label">Avg Latency</p>
        <p class="value small">{{ card.avg_latency|safe }} <span class="unit">ms</span></p>
      </div>
      <div>
        <p class="label">Success Rate</p>
        <p class="value small {% if card.error_flag %}bad{% else %}ok{% endif %}">{{ card.success_rate|safe }}{% if card.success_rate != "N/A" %}%{% endif %}</p>
      </div>
    </div>
  </div>
{% endfor %}
</section>

<section class="charts">
  <div class="panel">
    <h2>Throughput (Requests/s)</h2>
    <div class="chart-container"><canvas id="rpsChart"></canvas></div>
  </div>
  <div class="panel">
    <h2>P95 Latency (ms)</h2>
    <div class="chart-container"><canvas id="latencyChart"></canvas></div>
  </div>
</section>

<section class="panel">
  <h2>Latency Comparison (Avg ms)</h2>
  <p class="desc">Response times across the workload scenarios.</p>
  <table>
    <thead>
      <tr>
        <th>Workload</th>
        {% for card in report.runtimes %}
        <th class="num" style="color: {{ card.color }}">{{ card.label }}</th>
        {% endfor %}
      </tr>
    </thead>
    <tbody>
      {% for row in report.scenarios %}
      <tr id="scenario-{{ row.scenario }}">
        <td>
          <p class="workload">{{ row.title }}</p>
          <p class="desc">{{ row.description }}</p>
        </td>
        {% for cell in row.cells %}
        <td class="num" data-runtime="{{ cell.label }}"><span>{{ cell.avg|safe }}</span> <span class="unit">ms</span></td>
        {% endfor %}
      </tr>
      {% endfor %}
    </tbody>
  </table>
</section>

<footer>Detailed reports available in <code>{{ report.results_dir }}</code></footer>
</div>

<script>
  const report = {{ chart|tojson }};
  const labels = report.runtimes.map(r => r.toUpperCase());

  function barChart(id, label, series) {
    new Chart(document.getElementById(id), {
      type: 'bar',
      data: {
        labels: labels,
        datasets: [ {
          label: label,
          data: series,
          backgroundColor: report.runtimes.map(r => report.colors[r] + '44'),
          borderColor: report.runtimes.map(r => report.colors[r]),
          borderWidth: 2,
          borderRadius: 8
        } ]
      },
      options: {
        responsive: true,
        maintainAspectRatio: false,
        scales: {
          y: { beginAtZero: true, grid: { color: 'rgba(255,255,255,0.05)' }, ticks: { color: '#9CA3AF' } },
          x: { grid: { display: false }, ticks: { color: '#9CA3AF' } }
        },
        plugins: { legend: { display: false } }
      }
    });
  }

  barChart('rpsChart', 'Req/s', report.throughput);
  barChart('latencyChart', 'P95 ms', report.p95_latency);
</script>
</body>
</html>
"##;
