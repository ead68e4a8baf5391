pub mod page;
pub mod theme;

use serde::Serialize;

use crate::data::{AggregatedRecord, COL_PCT_IMPACTED, COL_STATE, COL_YEAR};
pub use theme::{Theme, PLOTLY_DARK};

pub const CHART_TITLE: &str = "Impact of Bee-Killers on Colonies in Selected States";

/// Text shown above the chart for a selection, embedding it verbatim.
pub fn status_text(selection: &str) -> String {
    format!("The bee-killer chosen by user was: {}", selection)
}

/// One line on the chart: every point of a single state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub x: Vec<i32>,
    /// `None` is drawn as a gap.
    pub y: Vec<Option<f64>>,
}

/// Declarative line chart: Year on x, impact on y, one series per state.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: &'static str,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub legend_title: &'static str,
    pub theme: &'static Theme,
    pub series: Vec<Series>,
}

impl ChartSpec {
    fn empty() -> Self {
        Self {
            title: CHART_TITLE,
            x_label: COL_YEAR,
            y_label: COL_PCT_IMPACTED,
            legend_title: COL_STATE,
            theme: &PLOTLY_DARK,
            series: Vec::new(),
        }
    }

    pub fn series_named(&self, name: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.name == name)
    }

    /// Plotly figure JSON (`{"data": [...], "layout": {...}}`) for the browser.
    pub fn figure(&self) -> Figure<'_> {
        Figure {
            data: self
                .series
                .iter()
                .map(|s| Trace {
                    kind: "scatter",
                    mode: "lines",
                    name: &s.name,
                    legendgroup: &s.name,
                    x: &s.x,
                    y: &s.y,
                    hovertemplate: format!(
                        "{}={}<br>{}=%{{x}}<br>{}=%{{y}}<extra></extra>",
                        self.legend_title, s.name, self.x_label, self.y_label
                    ),
                })
                .collect(),
            layout: Layout {
                title: Title { text: self.title },
                template: self.theme.template(),
                xaxis: AxisLayout {
                    title: Title { text: self.x_label },
                },
                yaxis: AxisLayout {
                    title: Title { text: self.y_label },
                },
                legend: LegendLayout {
                    title: Title {
                        text: self.legend_title,
                    },
                    tracegroupgap: 0,
                },
            },
        }
    }
}

impl Serialize for ChartSpec {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.figure().serialize(serializer)
    }
}

#[derive(Debug, Serialize)]
pub struct Figure<'a> {
    pub data: Vec<Trace<'a>>,
    pub layout: Layout<'a>,
}

#[derive(Debug, Serialize)]
pub struct Trace<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    mode: &'static str,
    name: &'a str,
    legendgroup: &'a str,
    x: &'a [i32],
    y: &'a [Option<f64>],
    hovertemplate: String,
}

#[derive(Debug, Serialize)]
pub struct Layout<'a> {
    title: Title<'a>,
    template: theme::Template<'a>,
    xaxis: AxisLayout<'a>,
    yaxis: AxisLayout<'a>,
    legend: LegendLayout<'a>,
}

#[derive(Debug, Serialize)]
struct Title<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct AxisLayout<'a> {
    title: Title<'a>,
}

#[derive(Debug, Serialize)]
struct LegendLayout<'a> {
    title: Title<'a>,
    tracegroupgap: u32,
}

/// Turn the rows of a filtered view into the status line and the chart.
///
/// Series appear in order of each state's first row; points keep row order.
pub fn project<V>(view: &V, selection: &str) -> (String, ChartSpec)
where
    V: AsRef<[AggregatedRecord]> + ?Sized,
{
    let mut chart = ChartSpec::empty();
    for row in view.as_ref() {
        let idx = match chart.series.iter().position(|s| s.name == row.state) {
            Some(i) => i,
            None => {
                chart.series.push(Series {
                    name: row.state.clone(),
                    x: Vec::new(),
                    y: Vec::new(),
                });
                chart.series.len() - 1
            }
        };
        let series = &mut chart.series[idx];
        series.x.push(row.year);
        series.y.push(row.pct_impacted);
    }
    (status_text(selection), chart)
}
