//! Diagram kind detection from the source header.

/// Diagram kinds recognised from the header line of the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagramKind {
    Flowchart,
    Sequence,
    Class,
    State,
    EntityRelationship,
    Journey,
    Gantt,
    Pie,
    Mindmap,
    Timeline,
    GitGraph,
    Quadrant,
    Requirement,
    C4,
    Sankey,
    XyChart,
    Block,
    Packet,
    Architecture,
    Kanban,
}

const KEYWORDS: &[(&str, DiagramKind)] = &[
    ("graph", DiagramKind::Flowchart),
    ("flowchart", DiagramKind::Flowchart),
    ("flowchart-elk", DiagramKind::Flowchart),
    ("sequenceDiagram", DiagramKind::Sequence),
    ("classDiagram", DiagramKind::Class),
    ("classDiagram-v2", DiagramKind::Class),
    ("stateDiagram", DiagramKind::State),
    ("stateDiagram-v2", DiagramKind::State),
    ("erDiagram", DiagramKind::EntityRelationship),
    ("journey", DiagramKind::Journey),
    ("gantt", DiagramKind::Gantt),
    ("pie", DiagramKind::Pie),
    ("mindmap", DiagramKind::Mindmap),
    ("timeline", DiagramKind::Timeline),
    ("gitGraph", DiagramKind::GitGraph),
    ("quadrantChart", DiagramKind::Quadrant),
    ("requirementDiagram", DiagramKind::Requirement),
    ("C4Context", DiagramKind::C4),
    ("C4Container", DiagramKind::C4),
    ("C4Component", DiagramKind::C4),
    ("C4Dynamic", DiagramKind::C4),
    ("C4Deployment", DiagramKind::C4),
    ("sankey-beta", DiagramKind::Sankey),
    ("xychart-beta", DiagramKind::XyChart),
    ("block-beta", DiagramKind::Block),
    ("packet-beta", DiagramKind::Packet),
    ("architecture-beta", DiagramKind::Architecture),
    ("kanban", DiagramKind::Kanban),
];

impl DiagramKind {
    /// Detect the diagram kind from its header keyword.
    ///
    /// YAML front matter, `%%` comments and blank lines before the header
    /// are skipped. Returns `None` when no known keyword starts the diagram.
    pub fn detect(source: &str) -> Option<Self> {
        let header = header_line(source)?;
        let keyword = header
            .split(|c: char| c.is_whitespace() || c == ';' || c == ':')
            .next()?;
        KEYWORDS
            .iter()
            .find(|(kw, _)| *kw == keyword)
            .map(|(_, kind)| *kind)
    }
}

fn header_line(source: &str) -> Option<&str> {
    let mut lines = source.lines().map(str::trim).peekable();
    if lines.peek() == Some(&"---") {
        lines.next();
        for line in lines.by_ref() {
            if line == "---" {
                break;
            }
        }
    }
    lines.find(|line| !line.is_empty() && !line.starts_with("%%"))
}

/// Prefixes of diagram kinds whose layout ignores the font size setting.
const FONT_SIZE_IGNORED_PREFIXES: [&str; 4] = ["sequence", "state", "er", "journey"];

/// Whether the font size control applies to this source.
///
/// Purely a presentation hint: the font size is still passed to the
/// renderer, which may ignore it.
pub fn is_font_size_honored(source: &str) -> bool {
    let head = source.trim_start();
    !FONT_SIZE_IGNORED_PREFIXES.iter().any(|prefix| {
        head.get(..prefix.len())
            .is_some_and(|start| start.eq_ignore_ascii_case(prefix))
    })
}
