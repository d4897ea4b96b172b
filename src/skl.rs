//! Tagged-line skeletal graph files.
//!
//! The format is line oriented: one tag or one curve point per line. Curves
//! are stored as discrete positions only; tangents are recomputed on load.
//! Malformed fields fall back to defaults with a diagnostic instead of
//! aborting the whole load.
//!
//! ```text
//! <scale>1</scale>
//! <vertices>
//! <vertex>
//! <pos>X Y Z</pos>
//! <radius>1</radius>
//! <cycle>0</cycle>
//! </vertex>
//! </vertices>
//! <edges>
//! <edge>
//! <source>0</source>
//! <target>1</target>
//! <cycle>0</cycle>
//! <curve>
//! X Y Z
//! </curve>
//! </edge>
//! </edges>
//! ```

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use glam::Vec3;
use tracing::warn;

use crate::error::GraphError;
use crate::geometry::curve::Curve;
use crate::model::{
    EdgeProperties, VertexId, VertexProperties, DEFAULT_VERTEX_RADIUS, MAX_VERTEX_RADIUS,
};
use crate::SkeletalGraph;

fn tag_body<'a>(line: &'a str, tag: &str) -> Option<&'a str> {
    line.strip_prefix('<')?
        .strip_prefix(tag)?
        .strip_prefix('>')?
        .strip_suffix('>')?
        .strip_suffix(tag)?
        .strip_suffix("</")
}

fn parse_vec3(text: &str) -> Option<Vec3> {
    let mut parts = text.split_whitespace();
    let x = parts.next()?.parse().ok()?;
    let y = parts.next()?.parse().ok()?;
    let z = parts.next()?.parse().ok()?;
    Some(Vec3::new(x, y, z))
}

impl SkeletalGraph {
    /// Writes the graph to `path` in the tagged-line format, with `scale`
    /// recorded in the header. Edge endpoints are stored as 0-based indices
    /// into the vertex block.
    pub fn export_to_file(&self, path: impl AsRef<Path>, scale: f32) -> Result<(), GraphError> {
        let file = File::create(path)?;
        let mut out = BufWriter::new(file);

        writeln!(out, "<scale>{scale}</scale>")?;

        let mut index_of: HashMap<VertexId, usize> = HashMap::new();
        writeln!(out, "<vertices>")?;
        for (index, (id, props)) in self.vertices().enumerate() {
            index_of.insert(id, index);
            writeln!(out, "<vertex>")?;
            writeln!(
                out,
                "<pos>{} {} {}</pos>",
                props.position.x, props.position.y, props.position.z
            )?;
            writeln!(out, "<radius>{}</radius>", props.radius)?;
            writeln!(out, "<cycle>{}</cycle>", props.in_cycle as u8)?;
            writeln!(out, "</vertex>")?;
        }
        writeln!(out, "</vertices>")?;

        writeln!(out, "<edges>")?;
        for (id, props) in self.edges() {
            let (source, target) = self
                .endpoints(id)
                .ok_or(GraphError::Inconsistency("edge without endpoints"))?;
            let (source_index, target_index) = match (index_of.get(&source), index_of.get(&target))
            {
                (Some(&s), Some(&t)) => (s, t),
                _ => return Err(GraphError::Inconsistency("edge endpoint not exported")),
            };
            writeln!(out, "<edge>")?;
            writeln!(out, "<source>{source_index}</source>")?;
            writeln!(out, "<target>{target_index}</target>")?;
            writeln!(out, "<cycle>{}</cycle>", props.in_cycle as u8)?;
            writeln!(out, "<curve>")?;
            for sample in props.curve.iter() {
                let p = sample.position;
                writeln!(out, "{} {} {}", p.x, p.y, p.z)?;
            }
            writeln!(out, "</curve>")?;
            writeln!(out, "</edge>")?;
        }
        writeln!(out, "</edges>")?;

        out.flush()?;
        Ok(())
    }

    /// Reads a graph back from `path`. Returns the graph and the recorded
    /// scale.
    ///
    /// Single malformed fields fall back to their defaults with a warning;
    /// edges referencing out-of-range vertex indices are skipped. Radii above
    /// the allowed maximum are reset to the default. Only failing to open or
    /// read the file aborts the load.
    pub fn import_from_file(path: impl AsRef<Path>) -> Result<(SkeletalGraph, f32), GraphError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let mut graph = SkeletalGraph::new();
        let mut scale = 1.0f32;
        let mut vertices: Vec<VertexId> = Vec::new();

        let mut in_vertices = false;
        let mut in_edges = false;
        let mut in_vertex = false;
        let mut in_edge = false;
        let mut in_curve = false;

        let mut vertex_props = VertexProperties::default();
        let mut edge_source = 0usize;
        let mut edge_target = 0usize;
        let mut edge_cycle = false;
        let mut curve_points: Vec<Vec3> = Vec::new();

        for line in reader.lines() {
            let line = line?;
            let line = line.trim();

            if let Some(body) = tag_body(line, "scale") {
                scale = body.parse().unwrap_or_else(|_| {
                    warn!("could not read scale from line: {line}");
                    1.0
                });
            } else if line == "<vertices>" {
                in_vertices = true;
            } else if line == "</vertices>" {
                in_vertices = false;
            } else if in_vertices {
                if line == "<vertex>" {
                    in_vertex = true;
                    vertex_props = VertexProperties::default();
                } else if line == "</vertex>" {
                    in_vertex = false;
                    vertices.push(graph.add_vertex(vertex_props.clone()));
                } else if in_vertex {
                    if let Some(body) = tag_body(line, "pos") {
                        vertex_props.position = parse_vec3(body).unwrap_or_else(|| {
                            warn!("could not read position from line: {line}");
                            Vec3::ZERO
                        });
                    } else if let Some(body) = tag_body(line, "radius") {
                        let radius: f32 = body.parse().unwrap_or_else(|_| {
                            warn!("could not read radius from line: {line}");
                            DEFAULT_VERTEX_RADIUS
                        });
                        vertex_props.radius = if radius > MAX_VERTEX_RADIUS {
                            warn!("clamping out-of-range radius {radius}");
                            DEFAULT_VERTEX_RADIUS
                        } else {
                            radius
                        };
                    } else if let Some(body) = tag_body(line, "cycle") {
                        vertex_props.in_cycle = body.parse::<u8>().map(|c| c != 0).unwrap_or_else(
                            |_| {
                                warn!("could not read cycle flag from line: {line}");
                                false
                            },
                        );
                    }
                }
            } else if line == "<edges>" {
                in_edges = true;
                if vertices.is_empty() {
                    warn!("edge block without vertices; stopping import early");
                    break;
                }
            } else if line == "</edges>" {
                in_edges = false;
            } else if in_edges {
                if line == "<edge>" {
                    in_edge = true;
                    edge_source = 0;
                    edge_target = 0;
                    edge_cycle = false;
                    curve_points.clear();
                } else if line == "</edge>" {
                    in_edge = false;
                    if edge_source < vertices.len() && edge_target < vertices.len() {
                        let from = vertices[edge_source];
                        let to = vertices[edge_target];
                        let added = match Curve::from_points(&curve_points) {
                            Some(curve) => graph.add_edge_with(
                                from,
                                to,
                                EdgeProperties {
                                    curve,
                                    in_cycle: edge_cycle,
                                },
                            ),
                            None => {
                                warn!("edge curve has fewer than two points; using a straight curve");
                                graph.add_edge(from, to)
                            }
                        };
                        // trust the stored flag over the derived one
                        if let Some(edge) = added {
                            if let Some(props) = graph.get_edge_mut(edge) {
                                props.in_cycle = edge_cycle;
                            }
                        }
                    } else {
                        warn!(
                            "skipping edge with invalid vertex indices: {edge_source}, {edge_target}"
                        );
                    }
                } else if in_edge {
                    if line == "<curve>" {
                        in_curve = true;
                    } else if line == "</curve>" {
                        in_curve = false;
                    } else if in_curve {
                        match parse_vec3(line) {
                            Some(point) => curve_points.push(point),
                            None => warn!("could not read curve point from line: {line}"),
                        }
                    } else if let Some(body) = tag_body(line, "source") {
                        edge_source = body.parse().unwrap_or_else(|_| {
                            warn!("could not read source from line: {line}");
                            usize::MAX
                        });
                    } else if let Some(body) = tag_body(line, "target") {
                        edge_target = body.parse().unwrap_or_else(|_| {
                            warn!("could not read target from line: {line}");
                            usize::MAX
                        });
                    } else if let Some(body) = tag_body(line, "cycle") {
                        edge_cycle = body.parse::<u8>().map(|c| c != 0).unwrap_or_else(|_| {
                            warn!("could not read cycle flag from line: {line}");
                            false
                        });
                    }
                }
            }
        }

        Ok((graph, scale))
    }
}
