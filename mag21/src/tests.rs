use std::path::{Path, PathBuf};

use super::*;
use crate::ser::SerializationFormat::{Json, Toml, Yaml};

/// Parse `/lib/top.mag` from `src`, collecting diagnostics
fn parse_mem(src: &mut MemSource) -> MagResult<(Ptr<Design>, Vec<Diagnostic>)> {
    let mut cache = DesignCache::new();
    let mut diags = Vec::new();
    let top = CellParser::new(&mut cache)
        .with_source(src)
        .with_diagnostics(&mut diags)
        .parse("top.mag", "/lib")?;
    Ok((top, diags))
}
/// Collect the kinds of `diags`
fn kinds(diags: &[Diagnostic]) -> Vec<DiagnosticKind> {
    diags.iter().map(|d| d.kind).collect()
}
/// Helper function: Grab the full path of resource-file `fname`
fn resource(rname: &str) -> String {
    format!("{}/resources/{}", env!("CARGO_MANIFEST_DIR"), rname)
}
/// Unit-square leaf cell
const INV: &str = "
    magic
    << metal1 >>
    rect 0 0 1 1
";

#[test]
fn it_parses_header_example() -> MagResult<()> {
    let src = r#"
        magic 4
        tech scmos
        timestamp 12345
        << metal1 >>
        rect 0 0 10 20
        << end >>
    "#;
    let design = parse_str(src)?;
    let header = Header {
        file_type: Some("magic".into()),
        magic_version: Some("4".into()),
        tech: Some("scmos".into()),
        timestamp: Some(12345),
        ..Default::default()
    };
    assert_eq!(design.header, header);
    assert_eq!(design.layers.len(), 1);
    let metal1 = design.layer("metal1").unwrap();
    assert_eq!(metal1.rects, vec![Rect::new(0, 0, 10, 20)]);
    assert!(metal1.labels.is_empty());
    assert!(design.instances.is_empty());
    Ok(())
}
#[test]
fn it_keeps_the_last_header_values() -> MagResult<()> {
    let src = r#"
        magic 4 a
        magic 5
        tech a
        tech b c
        timestamp 1
        timestamp 2
        timestamp x
    "#;
    let mut diags = Vec::new();
    let mut cache = DesignCache::new();
    let design = CellParser::new(&mut cache)
        .with_diagnostics(&mut diags)
        .parse_str(src, "/lib")?;
    // Later lines overwrite, but a missing `extra` does not clear an earlier one
    let header = Header {
        file_type: Some("magic".into()),
        magic_version: Some("5".into()),
        extra: Some("a".into()),
        tech: Some("b c".into()),
        timestamp: Some(2),
    };
    assert_eq!(design.header, header);
    assert_eq!(kinds(&diags), vec![DiagnosticKind::MalformedField]);
    assert_eq!(diags[0].line, 8);
    Ok(())
}
#[test]
fn it_orders_layers_by_first_appearance() -> MagResult<()> {
    let src = r#"
        << poly >>
        rect 0 0 1 1
        << metal1 >>
        rlabel metal1 0 0 0 0 1 A
        << ndiff >>
        << poly >>
        rect 5 5 6 6
    "#;
    let design = parse_str(src)?;
    let names: Vec<&str> = design.layers.keys().map(|s| s.as_str()).collect();
    assert_eq!(names, vec!["poly", "metal1", "ndiff"]);
    assert_eq!(design.layer("poly").unwrap().rects.len(), 2);
    assert!(design.layer("ndiff").unwrap().is_empty());
    assert!(design.instances.is_empty());
    Ok(())
}
#[test]
fn it_shares_subcells() -> MagResult<()> {
    let top = "
        use inv A
        use inv B
        use nand2 C
    ";
    let nand2 = "
        use inv I0
    ";
    let mut src = MemSource::new()
        .with("/lib/top.mag", top)
        .with("/lib/nand2.mag", nand2)
        .with("/lib/inv.mag", INV);
    let mut cache = DesignCache::new();
    let top = CellParser::new(&mut cache)
        .with_source(&mut src)
        .parse("top.mag", "/lib")?;

    // Each distinct file is read once
    assert_eq!(src.reads("/lib/inv.mag"), 1);
    assert_eq!(src.total_reads(), 3);
    assert_eq!(cache.len(), 3);
    assert_eq!(cache.hits(), 2);

    // And every instance of `inv` shares the same [Design]
    let a = top.instance("A").unwrap().design.clone().unwrap();
    let b = top.instance("B").unwrap().design.clone().unwrap();
    let c = top.instance("C").unwrap().design.clone().unwrap();
    let i0 = c.instance("I0").unwrap().design.clone().unwrap();
    assert!(Ptr::ptr_eq(&a, &b));
    assert_eq!(a, i0);
    assert_eq!(cache.design("/lib/inv.mag"), Some(&a));
    assert_eq!(a.name, "inv");
    Ok(())
}
#[test]
fn it_reuses_the_cache_across_parses() -> MagResult<()> {
    let mut src = MemSource::new()
        .with("/lib/top.mag", "use inv A")
        .with("/lib/inv.mag", INV);
    let mut cache = DesignCache::new();
    let first = CellParser::new(&mut cache)
        .with_source(&mut src)
        .parse("top.mag", "/lib")?;
    let second = CellParser::new(&mut cache)
        .with_source(&mut src)
        .parse("/lib/top.mag", "/elsewhere")?;
    assert!(Ptr::ptr_eq(&first, &second));
    assert_eq!(src.total_reads(), 2);
    Ok(())
}
#[test]
fn it_drops_malformed_rects() -> MagResult<()> {
    let src = r#"
        << metal1 >>
        rect 0 0 10
        rect 0 0 10 x
        rect 0 0 1.5 2
        rect 1 2 3 4
    "#;
    let mut diags = Vec::new();
    let mut cache = DesignCache::new();
    let design = CellParser::new(&mut cache)
        .with_diagnostics(&mut diags)
        .parse_str(src, "/lib")?;
    assert_eq!(design.layer("metal1").unwrap().rects, vec![Rect::new(1, 2, 3, 4)]);
    assert_eq!(kinds(&diags), vec![DiagnosticKind::MalformedField; 3]);
    let lines: Vec<usize> = diags.iter().map(|d| d.line).collect();
    assert_eq!(lines, vec![3, 4, 5]);
    Ok(())
}
#[test]
fn it_drops_short_labels() -> MagResult<()> {
    let src = r#"
        << metal1 >>
        rlabel metal1 0 0 1 1 0
        rlabel metal1 0 0 1 1
        rlabel metal1 0 0 1 1 0 out put
    "#;
    let design = parse_str(src)?;
    let labels = &design.layer("metal1").unwrap().labels;
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0].text, "out put");
    assert_eq!(labels[0].rect, Rect::new(0, 0, 1, 1));
    Ok(())
}
#[test]
fn it_omits_missing_instances() -> MagResult<()> {
    let top = "
        timestamp 5
        use ghost G1
        timestamp 9
        transform 1 0 1 0 1 1
        box 0 0 1 1
        use inv X
        use ghost G2
    ";
    let mut src = MemSource::new()
        .with("/lib/top.mag", top)
        .with("/lib/inv.mag", INV);
    let (top, diags) = parse_mem(&mut src)?;

    // Only `X` makes it in, and the absorbed timestamp does not reach the header
    let names: Vec<&str> = top.instances.iter().map(|i| i.instance_name.as_str()).collect();
    assert_eq!(names, vec!["X"]);
    assert_eq!(top.header.timestamp, Some(5));
    assert_eq!(top.instance("X").unwrap().transform, Transform::identity());

    // Both references are reported, but the file is only tried once
    assert_eq!(kinds(&diags), vec![DiagnosticKind::SubCellUnreadable; 2]);
    assert_eq!(diags[0].line, 3);
    assert_eq!(diags[0].path, PathBuf::from("/lib/top.mag"));
    assert_eq!(src.reads("/lib/ghost.mag"), 1);
    Ok(())
}
#[test]
fn it_fails_on_missing_top() -> MagResult<()> {
    let mut src = MemSource::new();
    let mut cache = DesignCache::new();
    let err = CellParser::new(&mut cache)
        .with_source(&mut src)
        .parse("nope.mag", "/lib")
        .unwrap_err();
    match err {
        MagError::FileUnreadable { path, .. } => assert_eq!(path, PathBuf::from("/lib/nope.mag")),
        e => panic!("Unexpected error: {:?}", e),
    }
    assert_eq!(cache.missing().count(), 1);
    Ok(())
}
#[test]
fn it_places_instances() -> MagResult<()> {
    let top = "
        use inv X
        transform 2 0 5 0 2 5
        box 0 0 1 1
    ";
    let mut src = MemSource::new()
        .with("/lib/top.mag", top)
        .with("/lib/inv.mag", INV);
    let (top, _) = parse_mem(&mut src)?;
    let inst = top.instance("X").unwrap();
    assert_eq!(inst.cell_type, "inv");
    assert_eq!(inst.file_path, PathBuf::from("/lib/inv.mag"));
    assert_eq!(inst.bbox, Rect::new(0, 0, 1, 1));

    // Map the child's rectangle through the instance transform
    let child = inst.design.as_ref().unwrap();
    let rect = child.layer("metal1").unwrap().rects[0];
    assert_eq!(rect.transform(&inst.transform), Rect::new(5, 5, 7, 7));
    Ok(())
}
#[test]
fn it_defaults_instance_boxes() -> MagResult<()> {
    let top = "
        use inv X
        transform 1 0 3 0 1 4
    ";
    let mut src = MemSource::new()
        .with("/lib/top.mag", top)
        .with("/lib/inv.mag", INV);
    let (top, diags) = parse_mem(&mut src)?;
    assert!(diags.is_empty());
    let inst = top.instance("X").unwrap();
    assert_eq!(inst.bbox, Rect::new(0, 0, 0, 0));
    assert_eq!(inst.timestamp, None);
    let flat = top.flatten(Composition::Chained);
    assert_eq!(flat.instances[0].bbox, Rect::new(3, 4, 3, 4));
    Ok(())
}
#[test]
fn it_attaches_timestamps_to_open_instances() -> MagResult<()> {
    let top = "
        timestamp 5
        use inv X
        timestamp 9
        use inv
    ";
    let mut src = MemSource::new()
        .with("/lib/top.mag", top)
        .with("/lib/inv.mag", INV);
    let (top, diags) = parse_mem(&mut src)?;
    assert_eq!(top.header.timestamp, Some(5));
    assert_eq!(top.instance("X").unwrap().timestamp, Some(9));
    // Unnamed instances take Magic's default name
    let unnamed = top.instance("inv_0").unwrap();
    assert_eq!(unnamed.timestamp, None);
    assert!(diags.is_empty());
    Ok(())
}
#[test]
fn it_closes_instances_at_eof() -> MagResult<()> {
    let top = "
        use inv X
        transform 1 0 3 0 1 4";
    let mut src = MemSource::new()
        .with("/lib/top.mag", top)
        .with("/lib/inv.mag", INV);
    let (top, _) = parse_mem(&mut src)?;
    assert_eq!(top.instances.len(), 1);
    assert_eq!(top.instances[0].transform, Transform::translate(3., 4.));
    Ok(())
}
#[test]
fn it_stops_at_end() -> MagResult<()> {
    let top = "
        << metal1 >>
        rect 0 0 1 1
        use inv X
        << end >>
        rect 2 2 3 3
        transform 2 0 0 0 2 0
        use inv Y
        use nand2 Z
    ";
    let mut src = MemSource::new()
        .with("/lib/top.mag", top)
        .with("/lib/inv.mag", INV);
    let (top, diags) = parse_mem(&mut src)?;
    assert_eq!(top.layer("metal1").unwrap().rects.len(), 1);
    assert_eq!(top.instances.len(), 1);
    assert_eq!(top.instances[0].transform, Transform::identity());
    assert_eq!(src.reads("/lib/nand2.mag"), 0);
    assert!(diags.is_empty());
    Ok(())
}
#[test]
fn it_reports_out_of_context_lines() -> MagResult<()> {
    let src = r#"
        rect 0 0 1 1
        transform 1 0 0 0 1 0
        box 0 0 1 1
        flabel metal1 s 0 0 1 1 0 FreeSans 8 0 0 0 A
        << m >>
        rect 0 0 1 1
    "#;
    let mut diags = Vec::new();
    let mut cache = DesignCache::new();
    let design = CellParser::new(&mut cache)
        .with_diagnostics(&mut diags)
        .parse_str(src, "/lib")?;
    assert_eq!(design.layer("m").unwrap().rects.len(), 1);
    use DiagnosticKind::*;
    assert_eq!(
        kinds(&diags),
        vec![OutOfContext, OutOfContext, OutOfContext, UnrecognizedLine]
    );
    assert_eq!(
        summarize(&diags),
        vec![(OutOfContext, 3), (UnrecognizedLine, 1)]
    );
    Ok(())
}
#[test]
fn it_resolves_rooted_paths() -> MagResult<()> {
    let top = "
        use inv X /pdk/cells/inv.mag
        use inv Y cells/inv.mag
    ";
    let mut src = MemSource::new()
        .with("/lib/top.mag", top)
        .with("/lib/inv.mag", INV)
        .with("/pdk/cells/inv.mag", INV);
    let (top, _) = parse_mem(&mut src)?;
    let x = top.instance("X").unwrap();
    let y = top.instance("Y").unwrap();
    assert_eq!(x.file_path, PathBuf::from("/pdk/cells/inv.mag"));
    assert_eq!(y.file_path, PathBuf::from("/lib/inv.mag"));
    assert_ne!(x.design, y.design);
    Ok(())
}
#[test]
fn it_parses_strings_relative_to_a_directory() -> MagResult<()> {
    let mut src = MemSource::new().with("/lib/inv.mag", INV);
    let mut cache = DesignCache::new();
    let design = CellParser::new(&mut cache)
        .with_source(&mut src)
        .parse_str("use inv X", "/lib")?;
    assert_eq!(design.instances.len(), 1);
    // The sub-cell is cached, the string-cell is not
    assert_eq!(cache.len(), 1);
    assert!(cache.contains("/lib/inv.mag"));
    Ok(())
}
#[test]
fn it_detects_cycles() -> MagResult<()> {
    let mut src = MemSource::new()
        .with("/lib/top.mag", "use a A")
        .with("/lib/a.mag", "use b B")
        .with("/lib/b.mag", "use a A");
    match parse_mem(&mut src) {
        Err(MagError::CyclicReference { path, stack }) => {
            assert_eq!(path, PathBuf::from("/lib/a.mag"));
            let expected: Vec<PathBuf> = ["/lib/top.mag", "/lib/a.mag", "/lib/b.mag"]
                .iter()
                .map(PathBuf::from)
                .collect();
            assert_eq!(stack, expected);
        }
        other => panic!("Expected a cycle, got {:?}", other),
    }
    Ok(())
}
#[test]
fn it_detects_self_reference() -> MagResult<()> {
    let mut src = MemSource::new().with("/lib/top.mag", "use top T");
    let err = parse_mem(&mut src).unwrap_err();
    assert!(matches!(err, MagError::CyclicReference { .. }));
    assert!(err.to_string().contains("top.mag"));
    Ok(())
}
#[test]
fn it_bounds_depth() -> MagResult<()> {
    let src = MemSource::new()
        .with("/lib/c0.mag", "use c1 X")
        .with("/lib/c1.mag", "use c2 X")
        .with("/lib/c2.mag", "use c3 X")
        .with("/lib/c3.mag", INV);

    let parse = |max_depth: usize| -> MagResult<Ptr<Design>> {
        let mut src = src.clone();
        let mut cache = DesignCache::new();
        let options = ParseOptions::builder().max_depth(max_depth).build().unwrap();
        let top = CellParser::new(&mut cache)
            .with_source(&mut src)
            .with_options(options)
            .parse("/lib/c0.mag", "/")?;
        Ok(top)
    };
    match parse(2) {
        Err(MagError::DepthExceeded { path, max_depth }) => {
            assert_eq!(path, PathBuf::from("/lib/c3.mag"));
            assert_eq!(max_depth, 2);
        }
        other => panic!("Expected depth failure, got {:?}", other),
    }
    let top = parse(3)?;
    assert_eq!(top.name, "c0");
    Ok(())
}
#[test]
fn it_uses_configured_extensions() -> MagResult<()> {
    let mut src = MemSource::new()
        .with("/lib/top.mag", "use inv X")
        .with("/lib/inv.ext", INV);
    let mut cache = DesignCache::new();
    let options = ParseOptions::builder().extension("ext").build().unwrap();
    let top = CellParser::new(&mut cache)
        .with_source(&mut src)
        .with_options(options)
        .parse("top.mag", "/lib")?;
    assert_eq!(top.instances[0].file_path, PathBuf::from("/lib/inv.ext"));
    Ok(())
}
#[test]
fn designs_are_send_and_sync() {
    fn check<T: Send + Sync>() {}
    check::<Design>();
    check::<Ptr<Design>>();
    check::<DesignCache>();
    check::<MagError>();
}

#[test]
fn it_reads_resources() -> MagResult<()> {
    let mut cache = DesignCache::new();
    let mut diags = Vec::new();
    let top = CellParser::new(&mut cache)
        .with_diagnostics(&mut diags)
        .parse(resource("top.mag"), ".")?;

    assert_eq!(top.name, "top");
    assert_eq!(top.header.file_type.as_deref(), Some("magic"));
    assert_eq!(top.header.magic_version, None);
    assert_eq!(top.header.tech.as_deref(), Some("scmos"));
    assert_eq!(top.header.timestamp, Some(1500000000));
    let names: Vec<&String> = top.layers.keys().collect();
    assert_eq!(names, vec!["metal1", "poly"]);
    let metal1 = top.layer("metal1").unwrap();
    assert_eq!(metal1.rects, vec![Rect::new(0, 0, 10, 20), Rect::new(30, 30, 40, 40)]);
    assert_eq!(metal1.labels[0].text, "top net");

    // `ghost` is missing, and `<< end >>` hides the last rectangle
    let insts: Vec<&str> = top.instances.iter().map(|i| i.instance_name.as_str()).collect();
    assert_eq!(insts, vec!["X", "N1"]);
    assert_eq!(top.instance("X").unwrap().timestamp, Some(100));
    assert_eq!(kinds(&diags), vec![DiagnosticKind::SubCellUnreadable]);
    assert_eq!(diags[0].line, 16);

    // `inv` is shared between `top` and `nand2`
    let x = top.instance("X").unwrap().design.clone().unwrap();
    let n1 = top.instance("N1").unwrap().design.clone().unwrap();
    let i0 = n1.instance("I0").unwrap().design.clone().unwrap();
    assert!(Ptr::ptr_eq(&x, &i0));
    assert_eq!(x.layer("labels").unwrap().labels[0].text, "Vdd supply");
    assert_eq!(cache.designs().count(), 3);
    assert_eq!(cache.missing().count(), 1);
    Ok(())
}
#[test]
fn it_flattens_resources() -> MagResult<()> {
    let top = parse_file(resource("top.mag"))?;
    let metal1 = |flat: &FlatLayout| -> Vec<Rect> {
        flat.rects
            .iter()
            .filter(|r| r.layer == "metal1")
            .map(|r| r.rect)
            .collect()
    };

    let chained = top.flatten(Composition::Chained);
    assert_eq!(
        metal1(&chained),
        vec![
            Rect::new(0, 0, 10, 20),
            Rect::new(30, 30, 40, 40),
            Rect::new(5, 5, 7, 7),
            Rect::new(20, 0, 21, 1),
            Rect::new(29, 0, 30, 1),
        ]
    );
    let paths: Vec<String> = chained.instances.iter().map(|i| i.path.join("/")).collect();
    assert_eq!(paths, vec!["X", "N1", "N1/I0", "N1/I1"]);
    assert!(chained.rects.contains(&FlatRect {
        layer: "nwell".into(),
        rect: Rect::new(1, 17, 21, 33),
    }));

    // Single-level composition ignores `N1`'s placement within `top`
    let single = top.flatten(Composition::SingleLevel);
    let rects = metal1(&single);
    assert_eq!(rects[3], Rect::new(0, 0, 1, 1));
    assert_eq!(rects[4], Rect::new(9, 0, 10, 1));
    Ok(())
}
#[test]
fn it_exports_libraries() -> MagResult<()> {
    let top = parse_file(resource("top.mag"))?;
    let lib = MagLibrary::from_design(&top)?;
    assert_eq!(lib.top, "top");
    assert_eq!(lib.cell_names(), vec!["inv", "nand2", "top"]);
    let paths: Vec<&Path> = lib.cells.iter().map(|c| c.path.as_path()).collect();
    assert_eq!(paths, vec![Path::new("inv.mag"), Path::new("nand2.mag"), Path::new("top.mag")]);
    let nand2 = &lib.cell("nand2").unwrap().design;
    assert_eq!(nand2.instances[1].file_path, PathBuf::from("inv.mag"));

    // Write to disk and read back
    let dir = tempfile::tempdir()?;
    for fmt in [Json, Yaml] {
        let fname = dir.path().join("top.lib");
        lib.save(fmt, &fname)?;
        let readback = MagLibrary::open(&fname, fmt)?;
        assert_eq!(readback, lib);
    }
    Ok(())
}
#[test]
fn it_writes_schema() -> MagResult<()> {
    let schema = schemars::schema_for!(MagLibrary);
    let json = Json.to_string(&schema)?;
    for name in ["Design", "Instance", "Transform", "LayerGeometry", "Header"] {
        assert!(schema.definitions.contains_key(name), "missing {}", name);
    }
    assert!(json.contains("\"cell_type\""));
    Ok(())
}
#[test]
fn it_loads_options_files() -> MagResult<()> {
    let dir = tempfile::tempdir()?;
    let fname = dir.path().join("mag21.toml");
    std::fs::write(&fname, "max_depth = 3\n")?;
    let opts = ParseOptions::open(&fname, Toml)?;
    assert_eq!(opts.max_depth, 3);
    assert_eq!(opts.extension, "mag");

    let fname = dir.path().join("mag21.yaml");
    opts.save(Yaml, &fname)?;
    assert_eq!(ParseOptions::open_any(&fname)?, opts);
    Ok(())
}
#[test]
fn it_reads_cells_with_invalid_utf8() -> MagResult<()> {
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("top.mag"), "magic\nuse leaf L\n")?;
    std::fs::write(
        dir.path().join("leaf.mag"),
        b"magic\n<< metal1 >>\nrlabel metal1 0 0 1 1 0 caf\xe9\nrect 0 0 2 2\n",
    )?;
    let mut diags = Vec::new();
    let mut cache = DesignCache::new();
    let top = CellParser::new(&mut cache)
        .with_diagnostics(&mut diags)
        .parse("top.mag", dir.path())?;

    // The instance survives, with the offending byte replaced
    assert!(diags.is_empty());
    let leaf = top.instance("L").unwrap().design.clone().unwrap();
    let metal1 = leaf.layer("metal1").unwrap();
    assert_eq!(metal1.labels[0].text, "caf\u{FFFD}");
    assert_eq!(metal1.rects, vec![Rect::new(0, 0, 2, 2)]);
    Ok(())
}
