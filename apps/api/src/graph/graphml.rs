//! GraphML reader for the XML attributed-graph format graph builders export.
//!
//! Supports `<key>` declarations (with optional `<default>`), `<node>` and
//! `<edge>` elements with `<data>` children. Edge direction is ignored: the
//! knowledge graph is undirected.

use std::collections::{BTreeMap, HashMap};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::graph::loader::GraphError;
use crate::graph::{KnowledgeGraph, Relation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyDomain {
    Node,
    Edge,
    All,
    /// `graph`, `graphml`, `port` and other scopes never applied to nodes or edges.
    Other,
}

#[derive(Debug, Clone)]
struct KeyDef {
    name: String,
    domain: KeyDomain,
    default: Option<String>,
}

#[derive(Debug)]
enum Element {
    Node {
        id: String,
        attrs: BTreeMap<String, String>,
    },
    Edge {
        source: String,
        target: String,
        attrs: BTreeMap<String, String>,
    },
}

/// Parses a GraphML document into a [`KnowledgeGraph`].
pub fn parse_graphml(xml: &str) -> Result<KnowledgeGraph, GraphError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut keys: HashMap<String, KeyDef> = HashMap::new();
    let mut nodes: Vec<(String, BTreeMap<String, String>)> = Vec::new();
    let mut edges: Vec<(String, String, BTreeMap<String, String>)> = Vec::new();

    let mut saw_root = false;
    let mut open_key: Option<String> = None;
    let mut in_default = false;
    let mut current: Option<Element> = None;
    let mut open_data: Option<String> = None;
    let mut text = String::new();

    loop {
        let event = reader.read_event().map_err(|e| {
            GraphError::Format(format!(
                "invalid GraphML at byte {}: {e}",
                reader.buffer_position()
            ))
        })?;

        match event {
            Event::Start(e) => match e.local_name().as_ref() {
                b"graphml" => saw_root = true,
                b"key" => {
                    let (id, def) = key_def(&e)?;
                    keys.insert(id.clone(), def);
                    open_key = Some(id);
                }
                b"default" => {
                    in_default = true;
                    text.clear();
                }
                b"node" => current = Some(node_element(&e)?),
                b"edge" => current = Some(edge_element(&e)?),
                b"data" => {
                    open_data = Some(required(&e, "key")?);
                    text.clear();
                }
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"key" => {
                    let (id, def) = key_def(&e)?;
                    keys.insert(id, def);
                }
                b"node" => {
                    if let Element::Node { id, attrs } = node_element(&e)? {
                        nodes.push((id, attrs));
                    }
                }
                b"edge" => {
                    if let Element::Edge {
                        source,
                        target,
                        attrs,
                    } = edge_element(&e)?
                    {
                        edges.push((source, target, attrs));
                    }
                }
                b"data" => {
                    let key = required(&e, "key")?;
                    set_data(&mut current, &keys, &key, String::new());
                }
                _ => {}
            },
            Event::Text(t) => {
                if open_data.is_some() || in_default {
                    let value = t
                        .unescape()
                        .map_err(|e| GraphError::Format(format!("bad text content: {e}")))?;
                    text.push_str(&value);
                }
            }
            Event::CData(c) => {
                if open_data.is_some() || in_default {
                    text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"default" => {
                    if let Some(def) = open_key.as_ref().and_then(|k| keys.get_mut(k)) {
                        def.default = Some(std::mem::take(&mut text));
                    }
                    in_default = false;
                }
                b"key" => open_key = None,
                b"data" => {
                    if let Some(key) = open_data.take() {
                        set_data(&mut current, &keys, &key, std::mem::take(&mut text));
                    }
                }
                b"node" | b"edge" => match current.take() {
                    Some(Element::Node { id, attrs }) => nodes.push((id, attrs)),
                    Some(Element::Edge {
                        source,
                        target,
                        attrs,
                    }) => edges.push((source, target, attrs)),
                    None => {}
                },
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_root {
        return Err(GraphError::Format(
            "document has no <graphml> root element".to_string(),
        ));
    }

    let mut graph = KnowledgeGraph::new();
    for (id, mut attrs) in nodes {
        apply_defaults(&mut attrs, &keys, KeyDomain::Node);
        graph.upsert_node(&id, attrs);
    }
    for (source, target, mut attrs) in edges {
        apply_defaults(&mut attrs, &keys, KeyDomain::Edge);
        graph.add_edge(&source, &target, Relation::from_attrs(&attrs));
    }
    Ok(graph)
}

fn attributes(e: &BytesStart<'_>) -> Result<HashMap<String, String>, GraphError> {
    let mut out = HashMap::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| GraphError::Format(format!("bad attribute: {err}")))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| GraphError::Format(format!("bad attribute value: {err}")))?
            .into_owned();
        out.insert(key, value);
    }
    Ok(out)
}

fn required(e: &BytesStart<'_>, name: &str) -> Result<String, GraphError> {
    attributes(e)?.remove(name).ok_or_else(|| {
        GraphError::Format(format!(
            "<{}> is missing the '{name}' attribute",
            String::from_utf8_lossy(e.local_name().as_ref())
        ))
    })
}

fn key_def(e: &BytesStart<'_>) -> Result<(String, KeyDef), GraphError> {
    let mut attrs = attributes(e)?;
    let id = attrs
        .remove("id")
        .ok_or_else(|| GraphError::Format("<key> is missing the 'id' attribute".to_string()))?;
    let domain = match attrs.get("for").map(String::as_str) {
        Some("node") => KeyDomain::Node,
        Some("edge") => KeyDomain::Edge,
        Some("all") | None => KeyDomain::All,
        Some(_) => KeyDomain::Other,
    };
    let name = attrs.remove("attr.name").unwrap_or_else(|| id.clone());
    Ok((
        id,
        KeyDef {
            name,
            domain,
            default: None,
        },
    ))
}

fn node_element(e: &BytesStart<'_>) -> Result<Element, GraphError> {
    Ok(Element::Node {
        id: required(e, "id")?,
        attrs: BTreeMap::new(),
    })
}

fn edge_element(e: &BytesStart<'_>) -> Result<Element, GraphError> {
    let mut attrs = attributes(e)?;
    let source = attrs
        .remove("source")
        .ok_or_else(|| GraphError::Format("<edge> is missing 'source'".to_string()))?;
    let target = attrs
        .remove("target")
        .ok_or_else(|| GraphError::Format("<edge> is missing 'target'".to_string()))?;
    Ok(Element::Edge {
        source,
        target,
        attrs: BTreeMap::new(),
    })
}

/// Stores a `<data>` value under the key's declared attribute name. Data
/// outside a node or edge (graph-level data) is ignored.
fn set_data(
    current: &mut Option<Element>,
    keys: &HashMap<String, KeyDef>,
    key: &str,
    value: String,
) {
    let name = keys
        .get(key)
        .map(|k| k.name.clone())
        .unwrap_or_else(|| key.to_string());
    match current {
        Some(Element::Node { attrs, .. }) | Some(Element::Edge { attrs, .. }) => {
            attrs.insert(name, value);
        }
        None => {}
    }
}

fn apply_defaults(
    attrs: &mut BTreeMap<String, String>,
    keys: &HashMap<String, KeyDef>,
    domain: KeyDomain,
) {
    for def in keys.values() {
        if def.domain != domain && def.domain != KeyDomain::All {
            continue;
        }
        if let Some(default) = &def.default {
            attrs
                .entry(def.name.clone())
                .or_insert_with(|| default.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeKind;

    const SAMPLE: &str = r#"<?xml version='1.0' encoding='utf-8'?>
<graphml xmlns="http://graphml.graphdrawing.org/xmlns">
  <key id="d0" for="node" attr.name="type" attr.type="string"/>
  <key id="d1" for="node" attr.name="label" attr.type="string"/>
  <key id="d2" for="node" attr.name="company" attr.type="string">
    <default>Unknown Company</default>
  </key>
  <key id="d3" for="edge" attr.name="relation" attr.type="string"/>
  <key id="d4" for="edge" attr.name="confidence" attr.type="double"/>
  <graph edgedefault="undirected">
    <node id="https://jobs.example/1">
      <data key="d0">job</data>
      <data key="d1">Data Analyst &amp; Reporter</data>
    </node>
    <node id="python"><data key="d0">skill</data></node>
    <node id="sql"><data key="d0">skill</data></node>
    <edge source="https://jobs.example/1" target="python">
      <data key="d3">requires</data>
      <data key="d4">0.9</data>
    </edge>
    <edge source="https://jobs.example/1" target="sql">
      <data key="d3">requires</data>
    </edge>
  </graph>
</graphml>"#;

    #[test]
    fn test_parses_nodes_edges_and_keys() {
        let g = parse_graphml(SAMPLE).unwrap();
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 2);

        let job = g.node("https://jobs.example/1").unwrap();
        assert_eq!(job.kind, NodeKind::Job);
        assert_eq!(job.attr("label"), Some("Data Analyst & Reporter"));
        // Key default applied
        assert_eq!(job.attr("company"), Some("Unknown Company"));

        let neighbors = g.neighbors("https://jobs.example/1");
        assert_eq!(neighbors[0].0.id, "python");
        assert_eq!(neighbors[0].1.kind, "requires");
        assert!((neighbors[0].1.weight - 0.9).abs() < f64::EPSILON);
        assert_eq!(neighbors[1].1.weight, 1.0);
    }

    #[test]
    fn test_graph_scoped_default_is_not_applied_to_nodes() {
        let xml = r#"<graphml>
            <key id="g0" for="graph" attr.name="name"><default>linkedin_kg</default></key>
            <key id="a0" for="all" attr.name="source"><default>crawler</default></key>
            <graph>
              <node id="python"/>
              <edge source="python" target="sql"/>
            </graph></graphml>"#;
        let g = parse_graphml(xml).unwrap();
        let node = g.node("python").unwrap();
        assert_eq!(node.attr("name"), None);
        assert_eq!(node.label(), "python");
        assert_eq!(node.attr("source"), Some("crawler"));
    }

    #[test]
    fn test_edges_may_precede_nodes() {
        let xml = r#"<graphml>
            <key id="t" for="node" attr.name="type"/>
            <graph>
              <edge source="j" target="s"/>
              <node id="j"><data key="t">job</data></node>
              <node id="s"><data key="t">skill</data></node>
            </graph></graphml>"#;
        let g = parse_graphml(xml).unwrap();
        assert_eq!(g.node("j").map(|n| n.kind), Some(NodeKind::Job));
        assert_eq!(g.node("s").map(|n| n.kind), Some(NodeKind::Skill));
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn test_unknown_data_key_uses_key_id() {
        let xml = r#"<graphml><graph><node id="n"><data key="mystery">x</data></node></graph></graphml>"#;
        let g = parse_graphml(xml).unwrap();
        assert_eq!(g.node("n").unwrap().attr("mystery"), Some("x"));
    }

    #[test]
    fn test_missing_root_is_format_error() {
        let err = parse_graphml("<html><body/></html>").unwrap_err();
        assert!(matches!(err, GraphError::Format(_)));
    }

    #[test]
    fn test_malformed_xml_is_format_error() {
        let err = parse_graphml("<graphml><graph><node id='a'></graph>").unwrap_err();
        assert!(matches!(err, GraphError::Format(_)));
    }

    #[test]
    fn test_node_without_id_is_format_error() {
        let err = parse_graphml("<graphml><graph><node/></graph></graphml>").unwrap_err();
        assert!(matches!(err, GraphError::Format(_)));
    }
}
