use serde::Serialize;

/// Colours applied to every chart. plotly.js only accepts templates as
/// objects, so the named theme is expanded here.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: &'static str,
    pub paper_bgcolor: &'static str,
    pub plot_bgcolor: &'static str,
    pub font_color: &'static str,
    pub grid_color: &'static str,
    pub colorway: &'static [&'static str],
}

pub const PLOTLY_DARK: Theme = Theme {
    name: "plotly_dark",
    paper_bgcolor: "rgb(17,17,17)",
    plot_bgcolor: "rgb(17,17,17)",
    font_color: "#f2f5fa",
    grid_color: "#283442",
    colorway: &[
        "#636efa", "#EF553B", "#00cc96", "#ab63fa", "#FFA15A", "#19d3f3", "#FF6692", "#B6E880",
        "#FF97FF", "#FECB52",
    ],
};

#[derive(Debug, Serialize)]
pub struct Template<'a> {
    layout: TemplateLayout<'a>,
}

#[derive(Debug, Serialize)]
struct TemplateLayout<'a> {
    paper_bgcolor: &'a str,
    plot_bgcolor: &'a str,
    font: Font<'a>,
    colorway: &'a [&'a str],
    xaxis: Grid<'a>,
    yaxis: Grid<'a>,
}

#[derive(Debug, Serialize)]
struct Font<'a> {
    color: &'a str,
}

#[derive(Debug, Serialize)]
struct Grid<'a> {
    gridcolor: &'a str,
    linecolor: &'a str,
    zerolinecolor: &'a str,
}

impl Theme {
    pub fn template(&self) -> Template<'_> {
        let grid = || Grid {
            gridcolor: self.grid_color,
            linecolor: self.grid_color,
            zerolinecolor: self.grid_color,
        };
        Template {
            layout: TemplateLayout {
                paper_bgcolor: self.paper_bgcolor,
                plot_bgcolor: self.plot_bgcolor,
                font: Font {
                    color: self.font_color,
                },
                colorway: self.colorway,
                xaxis: grid(),
                yaxis: grid(),
            },
        }
    }
}
