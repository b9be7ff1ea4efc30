//!
//! # Hierarchical Cell Parser
//!
//! Reads a top-level Magic cell, and recursively every cell it instantiates,
//! memoizing each in a [DesignCache].
//!

// Std-Lib
use std::mem;
use std::path::{Path, PathBuf};
use std::sync::Arc;

// Crates.io
use log::debug;

// Local imports
use crate::cache::{CacheEntry, DesignCache};
use crate::data::{Design, Instance, LayerGeometry};
use crate::diag::{Diagnostic, DiagnosticKind, DiagnosticSink, LogSink};
use crate::error::{MagError, MagResult};
use crate::geom::{Rect, Transform};
use crate::options::ParseOptions;
use crate::ptr::Ptr;
use crate::read::{self, LineError, Statement};
use crate::resolve;
use crate::source::{CellSource, FsSource};

/// Parse the cell hierarchy rooted at file `path`, with default options,
/// a fresh [DesignCache], and diagnostics sent to the `log` facade.
pub fn parse_file(path: impl AsRef<Path>) -> MagResult<Ptr<Design>> {
    let mut cache = DesignCache::new();
    let top = CellParser::new(&mut cache).parse(path, ".")?;
    Ok(top)
}

/// Parse cell content `src` from string.
/// Sub-cells are resolved relative to the working directory.
pub fn parse_str(src: &str) -> MagResult<Design> {
    let mut cache = DesignCache::new();
    let design = CellParser::new(&mut cache).parse_str(src, ".")?;
    Ok(design)
}

///
/// # Cell Parser
///
/// Recursive-descent reader of Magic cell hierarchies.
/// Borrows a [DesignCache] for its lifetime, and optionally a [CellSource]
/// and [DiagnosticSink], defaulting to [FsSource] and [LogSink]:
///
/// ```text
/// let mut cache = DesignCache::new();
/// let mut diags = Vec::new();
/// let top = CellParser::new(&mut cache)
///     .with_diagnostics(&mut diags)
///     .parse("top.mag", "/path/to/lib")?;
/// ```
///
pub struct CellParser<'a> {
    /// Memoized cells, by resolved path
    cache: &'a mut DesignCache,
    /// Cell-content provider
    source: Box<dyn CellSource + 'a>,
    /// Diagnostic receiver
    diag: Box<dyn DiagnosticSink + 'a>,
    /// Options
    options: ParseOptions,
    /// Paths of the cells currently being parsed, outermost first.
    /// Doubles as the depth of the current cell.
    stack: Vec<PathBuf>,
}
impl<'a> CellParser<'a> {
    /// Create a new [CellParser] over `cache`, reading from the file system
    pub fn new(cache: &'a mut DesignCache) -> Self {
        Self {
            cache,
            source: Box::new(FsSource),
            diag: Box::new(LogSink),
            options: ParseOptions::default(),
            stack: Vec::new(),
        }
    }
    /// Read cells from `source`
    pub fn with_source(mut self, source: impl CellSource + 'a) -> Self {
        self.source = Box::new(source);
        self
    }
    /// Send diagnostics to `sink`
    pub fn with_diagnostics(mut self, sink: impl DiagnosticSink + 'a) -> Self {
        self.diag = Box::new(sink);
        self
    }
    /// Use `options`
    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }
    /// Parse the cell hierarchy rooted at `file_path`, resolved relative to `base_dir`.
    ///
    /// Returns the (possibly cached) top-level [Design].
    /// Fails if the top-level file is unreadable, or if the hierarchy is cyclic or too deep.
    /// All other problems are reported as [Diagnostic]s, and skipped.
    pub fn parse(
        &mut self,
        file_path: impl AsRef<Path>,
        base_dir: impl AsRef<Path>,
    ) -> MagResult<Ptr<Design>> {
        let file_path = file_path.as_ref();
        let path = resolve::absolutize(file_path, base_dir).map_err(|e| {
            MagError::FileUnreadable {
                path: file_path.to_path_buf(),
                source: Arc::new(e),
            }
        })?;
        match self.load(&path)? {
            CacheEntry::Parsed(design) => Ok(design),
            CacheEntry::Missing(source) => Err(MagError::FileUnreadable { path, source }),
        }
    }
    /// Parse cell content `src`, as though read from a file in directory `dir`.
    /// The resulting [Design] is not itself cached, but its sub-cells are.
    pub fn parse_str(&mut self, src: &str, dir: impl AsRef<Path>) -> MagResult<Design> {
        let path = resolve::absolutize("<string>", dir).map_err(MagError::Io)?;
        self.parse_cell(&path, src)
    }
    /// Load the cell at resolved path `path`: from the cache if possible,
    /// and otherwise by reading and parsing it, and adding it to the cache.
    fn load(&mut self, path: &Path) -> MagResult<CacheEntry> {
        if let Some(entry) = self.cache.lookup(path) {
            return Ok(entry);
        }
        if self.stack.iter().any(|p| p == path) {
            return Err(MagError::CyclicReference {
                path: path.to_path_buf(),
                stack: self.stack.clone(),
            });
        }
        // The top-level cell sits at depth zero
        if self.stack.len() > self.options.max_depth {
            return Err(MagError::DepthExceeded {
                path: path.to_path_buf(),
                max_depth: self.options.max_depth,
            });
        }
        let src = match self.source.read(path) {
            Ok(src) => src,
            Err(e) => {
                let entry = CacheEntry::Missing(Arc::new(e));
                self.cache.insert(path.to_path_buf(), entry.clone());
                return Ok(entry);
            }
        };
        debug!("Parsing cell {:?}", path);
        self.stack.push(path.to_path_buf());
        let design = self.parse_cell(path, &src);
        self.stack.pop();

        let entry = CacheEntry::Parsed(Ptr::new(design?));
        self.cache.insert(path.to_path_buf(), entry.clone());
        Ok(entry)
    }
    /// Parse the content `src` of the cell at `path`, loading its sub-cells along the way.
    fn parse_cell(&mut self, path: &Path, src: &str) -> MagResult<Design> {
        let dir = path.parent().unwrap_or_else(|| Path::new("/")).to_path_buf();
        let mut cell = CellState::new(Design::new(path));

        for (line_num, line) in read::lines(src) {
            let stmt = match read::parse_line(line) {
                Ok(stmt) => stmt,
                Err(LineError::Unrecognized) => {
                    self.report(path, line_num, DiagnosticKind::UnrecognizedLine, line);
                    continue;
                }
                Err(LineError::Malformed { keyword, reason }) => {
                    let msg = format!("dropping `{}` line: {}", keyword, reason);
                    self.report(path, line_num, DiagnosticKind::MalformedField, msg);
                    continue;
                }
            };
            let applied = match stmt {
                Statement::End => break,
                Statement::Use {
                    cell_type,
                    instance_name,
                    path: explicit,
                } => {
                    cell.close_instance();
                    let instance_name = match instance_name {
                        Some(name) => name.to_string(),
                        None => format!("{}_0", cell_type), // Magic's default use-name
                    };
                    let file_path =
                        resolve::subcell_path(cell_type, &dir, explicit, &self.options.extension);
                    cell.instance = match self.load(&file_path)? {
                        CacheEntry::Parsed(design) => InstanceState::Open(Instance::new(
                            cell_type,
                            instance_name,
                            file_path,
                            design,
                        )),
                        CacheEntry::Missing(err) => {
                            let msg = format!(
                                "omitting instance `{}`: cannot read cell `{}` at {:?}: {}",
                                instance_name, cell_type, file_path, err
                            );
                            self.report(path, line_num, DiagnosticKind::SubCellUnreadable, msg);
                            InstanceState::Omitted
                        }
                    };
                    Ok(())
                }
                Statement::Magic { version, extra } => {
                    cell.set_magic(version, extra);
                    Ok(())
                }
                Statement::Tech(tech) => {
                    cell.design.header.tech = Some(tech.to_string());
                    Ok(())
                }
                Statement::Timestamp(ts) => {
                    cell.set_timestamp(ts);
                    Ok(())
                }
                Statement::Layer(name) => {
                    cell.set_layer(name);
                    Ok(())
                }
                Statement::Rect(rect) => cell.current_layer("rect").map(|l| l.rects.push(rect)),
                Statement::Label(label) => {
                    cell.current_layer("rlabel").map(|l| l.labels.push(label))
                }
                Statement::Transform(trans) => cell.set_transform(trans),
                Statement::Box(bbox) => cell.set_box(bbox),
            };
            if let Err(msg) = applied {
                self.report(path, line_num, DiagnosticKind::OutOfContext, msg);
            }
        }
        Ok(cell.finish())
    }
    /// Send a [Diagnostic] to our sink
    fn report(&mut self, path: &Path, line: usize, kind: DiagnosticKind, msg: impl Into<String>) {
        self.diag.report(Diagnostic {
            kind,
            path: path.to_path_buf(),
            line,
            message: msg.into(),
        });
    }
}

/// # Instance Accumulator State
///
/// Placement statements (`transform`, `box`, `timestamp`) apply to the instance
/// opened by the most recent `use`, until the next `use`, `<< end >>`, or end-of-file.
#[derive(Debug)]
enum InstanceState {
    /// No `use` seen, or the last instance was closed
    Closed,
    /// Accumulating placement for a resolved instance
    Open(Instance),
    /// The last `use` referenced an unreadable cell.
    /// Its placement statements are absorbed, and the instance dropped.
    Omitted,
}

/// Per-cell parsing state: the [Design] under construction,
/// the current layer, and the instance accumulator.
struct CellState {
    design: Design,
    layer: Option<String>,
    instance: InstanceState,
}
impl CellState {
    fn new(design: Design) -> Self {
        Self {
            design,
            layer: None,
            instance: InstanceState::Closed,
        }
    }
    /// Close the open instance, if any, appending it to our [Design]
    fn close_instance(&mut self) {
        if let InstanceState::Open(inst) = mem::replace(&mut self.instance, InstanceState::Closed)
        {
            self.design.instances.push(inst);
        }
    }
    /// Record a `magic` line. Versions and extras overwrite, but are never cleared.
    fn set_magic(&mut self, version: Option<&str>, extra: Option<&str>) {
        let header = &mut self.design.header;
        header.file_type = Some(String::from("magic"));
        if let Some(version) = version {
            header.magic_version = Some(version.to_string());
        }
        if let Some(extra) = extra {
            header.extra = Some(extra.to_string());
        }
    }
    /// Timestamps belong to the open instance, if any, and otherwise to the header
    fn set_timestamp(&mut self, ts: i64) {
        match &mut self.instance {
            InstanceState::Open(inst) => inst.timestamp = Some(ts),
            InstanceState::Omitted => (),
            InstanceState::Closed => self.design.header.timestamp = Some(ts),
        }
    }
    fn set_layer(&mut self, name: &str) {
        self.design.layer_mut(name);
        self.layer = Some(name.to_string());
    }
    fn set_transform(&mut self, trans: Transform) -> Result<(), String> {
        match &mut self.instance {
            InstanceState::Open(inst) => inst.transform = trans,
            InstanceState::Omitted => (),
            InstanceState::Closed => return Err(no_instance("transform")),
        }
        Ok(())
    }
    fn set_box(&mut self, bbox: Rect) -> Result<(), String> {
        match &mut self.instance {
            InstanceState::Open(inst) => inst.bbox = bbox,
            InstanceState::Omitted => (),
            InstanceState::Closed => return Err(no_instance("box")),
        }
        Ok(())
    }
    /// Get the geometry of the current layer, failing if no layer has been declared
    fn current_layer(&mut self, keyword: &str) -> Result<&mut LayerGeometry, String> {
        match &self.layer {
            Some(name) => Ok(self.design.layer_mut(name)),
            None => Err(format!("dropping `{}` line before any layer", keyword)),
        }
    }
    /// Close any open instance, and return the completed [Design]
    fn finish(mut self) -> Design {
        self.close_instance();
        self.design
    }
}
fn no_instance(keyword: &str) -> String {
    format!("dropping `{}` line outside any instance", keyword)
}
