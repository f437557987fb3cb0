//! CT script rendering and writing.

use std::fmt::{self, Write as FmtWrite};
use std::io::Write as IoWrite;
use std::path::Path;

use aiect_counters::{CounterDescriptor, Tile, format_address};
use aiect_manifest::InstrumentationRecord;
use tempfile::{Builder, NamedTempFile};
use tracing::{debug, info, warn};

use crate::config::ScriptConfig;
use crate::{EmitError, Result};

/// A control program paired with the counters inside its column range.
#[derive(Clone, Debug)]
pub struct ProbeBlock<'a> {
    pub record: &'a InstrumentationRecord,
    pub counters: Vec<CounterDescriptor>,
}

impl<'a> ProbeBlock<'a> {
    #[must_use]
    pub const fn new(record: &'a InstrumentationRecord, counters: Vec<CounterDescriptor>) -> Self {
        Self { record, counters }
    }

    /// Blocks without probe points or counters produce no `jprobe`.
    #[must_use]
    pub fn is_emittable(&self) -> bool {
        self.record.has_probe_points() && !self.counters.is_empty()
    }
}

/// Counters of one tile, as indices into a block's counter list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileGroup {
    pub tile: Tile,
    pub counters: Vec<usize>,
}

/// Group counters by tile, keeping first-encounter order of tiles.
#[must_use]
pub fn group_by_tile(counters: &[CounterDescriptor]) -> Vec<TileGroup> {
    let mut groups: Vec<TileGroup> = Vec::new();
    for (idx, counter) in counters.iter().enumerate() {
        let tile = counter.tile();
        match groups.iter_mut().find(|g| g.tile == tile) {
            Some(group) => group.counters.push(idx),
            None => groups.push(TileGroup {
                tile,
                counters: vec![idx],
            }),
        }
    }
    groups
}

/// Renders and writes CT scripts.
#[derive(Clone, Debug, Default)]
pub struct ScriptEmitter {
    config: ScriptConfig,
}

impl ScriptEmitter {
    #[must_use]
    pub const fn new(config: ScriptConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &ScriptConfig {
        &self.config
    }

    /// Render the full script.
    ///
    /// `counters` is the full counter set and feeds the metadata list;
    /// `blocks` must already be in ascending program id order.
    ///
    /// # Panics
    ///
    /// Never in practice: formatting into a `String` cannot fail.
    #[must_use]
    pub fn render(&self, blocks: &[ProbeBlock<'_>], counters: &[CounterDescriptor]) -> String {
        let mut out = String::new();
        self.render_into(&mut out, blocks, counters)
            .expect("formatting CT script");
        out
    }

    fn render_into(
        &self,
        out: &mut String,
        blocks: &[ProbeBlock<'_>],
        counters: &[CounterDescriptor],
    ) -> fmt::Result {
        self.push_begin(out, counters)?;
        for block in blocks {
            if block.is_emittable() {
                push_probe(out, block)?;
            } else {
                debug!(file = %block.record.file_name, "no probe points or counters, skipping jprobe");
            }
        }
        self.push_end(out)
    }

    fn push_begin(&self, out: &mut String, counters: &[CounterDescriptor]) -> fmt::Result {
        for line in &self.config.banner {
            writeln!(out, "# {line}")?;
        }
        if !self.config.banner.is_empty() {
            out.push('\n');
        }

        out.push_str("begin\n{\n");
        out.push_str("    ts_start = timestamp32()\n");
        writeln!(out, "    print(\"\\n{} tracing started\\n\")", escape(&self.config.title))?;
        out.push_str("@blockopen\nimport json\nimport os\n\n");
        out.push_str("# Initialize data collection\n");
        out.push_str("profile_data = {\n");
        out.push_str("    \"start_timestamp\": ts_start,\n");
        out.push_str("    \"counter_metadata\": [\n");

        for (i, counter) in counters.iter().enumerate() {
            push_counter_metadata(out, counter)?;
            if i + 1 < counters.len() {
                out.push(',');
            }
            out.push('\n');
        }

        out.push_str("    ],\n");
        out.push_str("    \"probes\": []\n");
        out.push_str("}\n@blockclose\n}\n\n");
        Ok(())
    }

    fn push_end(&self, out: &mut String) -> fmt::Result {
        out.push_str("end\n{\n");
        out.push_str("    ts_end = timestamp32()\n");
        writeln!(out, "    print(\"\\n{} tracing ended\\n\")", escape(&self.config.title))?;
        out.push_str("@blockopen\n");
        out.push_str("profile_data[\"end_timestamp\"] = ts_end\n");
        out.push_str(
            "profile_data[\"total_time\"] = ts_end - profile_data[\"start_timestamp\"]\n\n",
        );
        writeln!(
            out,
            "output_path = os.path.join(os.getcwd(), \"{}\")",
            escape(&self.config.results_file)
        )?;
        out.push_str("with open(output_path, \"w\") as f:\n");
        out.push_str("    json.dump(profile_data, f, indent=2)\n");
        out.push_str("print(f\"Profile data written to {output_path}\")\n");
        out.push_str("@blockclose\n}\n");
        Ok(())
    }

    /// Render the script and write it to `path`.
    ///
    /// The script is staged in a temporary file next to `path` and renamed
    /// into place, so a failed write leaves no partial script behind.
    ///
    /// # Errors
    ///
    /// Returns [`EmitError::Create`] if the staging file cannot be created
    /// and [`EmitError::Write`] if writing or renaming fails.
    pub fn write(
        &self,
        path: impl AsRef<Path>,
        blocks: &[ProbeBlock<'_>],
        counters: &[CounterDescriptor],
    ) -> Result<()> {
        let path = path.as_ref();
        let script = self.render(blocks, counters);

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let staged = staging_file(dir, path).map_err(|source| {
            warn!(path = %path.display(), error = %source, "unable to create CT file");
            EmitError::Create {
                path: path.to_path_buf(),
                source,
            }
        })?;

        if let Err(source) = persist_script(staged, path, script.as_bytes()) {
            warn!(path = %path.display(), error = %source, "unable to write CT file");
            return Err(EmitError::Write {
                path: path.to_path_buf(),
                source,
            });
        }

        info!(path = %path.display(), bytes = script.len(), "generated CT file");
        Ok(())
    }
}

/// Staging file in `dir` carrying the permissions the script should end up with.
///
/// An existing script keeps its mode; a new one gets `0o666` less the umask,
/// as a plain create would.
fn staging_file(dir: &Path, path: &Path) -> std::io::Result<NamedTempFile> {
    #[cfg_attr(not(unix), allow(unused_mut))]
    let mut builder = Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    let staged = builder.tempfile_in(dir)?;
    if let Ok(existing) = std::fs::metadata(path) {
        staged.as_file().set_permissions(existing.permissions())?;
    }
    Ok(staged)
}

fn persist_script(mut staged: NamedTempFile, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    staged.write_all(bytes)?;
    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|e| e.error)?;
    Ok(())
}

fn push_counter_metadata(out: &mut String, counter: &CounterDescriptor) -> fmt::Result {
    write!(
        out,
        "        {{\"column\": {}, \"row\": {}, \"counter\": {}, \"module\": \"{}\", \"address\": \"{}\"",
        counter.column,
        counter.row,
        counter.counter_number,
        escape(&counter.module),
        format_address(counter.address),
    )?;
    if !counter.metric_set.is_empty() {
        write!(out, ", \"metric_set\": \"{}\"", escape(&counter.metric_set))?;
    }
    if let Some(direction) = counter.port_direction.as_str() {
        write!(out, ", \"port_direction\": \"{direction}\"")?;
    }
    out.push('}');
    Ok(())
}

fn push_probe(out: &mut String, block: &ProbeBlock<'_>) -> fmt::Result {
    let record = block.record;
    let base_name = record.base_name();

    writeln!(
        out,
        "# Probes for {base_name} (columns {}-{})",
        record.column_start, record.column_end
    )?;

    let lines: Vec<String> = record.line_numbers().map(|n| n.to_string()).collect();
    writeln!(out, "jprobe:{base_name}:uc{}:line{}", record.core_index, lines.join(","))?;
    out.push_str("{\n    ts = timestamp32()\n");

    for (i, counter) in block.counters.iter().enumerate() {
        writeln!(out, "    ctr_{i} = read_reg({})", format_address(counter.address))?;
    }

    out.push_str("    print(f\"Probe fired: ts={ts}\")\n");
    out.push_str("@blockopen\n");
    out.push_str("profile_data[\"probes\"].append({\n");
    writeln!(out, "    \"asm_file\": \"{}\",", escape(base_name))?;
    out.push_str("    \"timestamp\": ts,\n");
    out.push_str("    \"tiles\": [\n");

    let groups = group_by_tile(&block.counters);
    for (i, group) in groups.iter().enumerate() {
        let names: Vec<String> = group.counters.iter().map(|idx| format!("ctr_{idx}")).collect();
        write!(
            out,
            "        {{\"col\": {}, \"row\": {}, \"counters\": [{}]}}",
            group.tile.column,
            group.tile.row,
            names.join(", ")
        )?;
        if i + 1 < groups.len() {
            out.push(',');
        }
        out.push('\n');
    }

    out.push_str("    ]\n})\n@blockclose\n}\n\n");
    Ok(())
}

/// Escape a value for a double-quoted string literal in the script.
fn escape(value: &str) -> std::borrow::Cow<'_, str> {
    if value.contains(['"', '\\']) {
        value.replace('\\', "\\\\").replace('"', "\\\"").into()
    } else {
        value.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aiect_counters::{ChipShifts, CounterResolver, MetricSetTable, PortDirection, RawCounter};
    use aiect_manifest::ProbePoint;

    fn record(id: u32, lines: &[u32]) -> InstrumentationRecord {
        InstrumentationRecord::new(
            "/work",
            format!("aie_runtime_control{id}.asm"),
            lines.iter().copied().map(ProbePoint::at_line).collect(),
        )
        .unwrap()
    }

    fn resolver() -> CounterResolver {
        let metric_sets = MetricSetTable::from_module_metrics([vec![
            (Tile::new(0, 0), "read_bandwidth"),
            (Tile::new(0, 2), "heat_map"),
        ]]);
        CounterResolver::new(ChipShifts::new(25, 20).unwrap(), metric_sets)
    }

    #[test]
    fn test_group_by_tile_encounter_order() {
        let r = resolver();
        let counters: Vec<CounterDescriptor> = [(1, 2), (0, 2), (1, 2), (0, 3), (0, 2)]
            .iter()
            .enumerate()
            .map(|(i, &(c, row))| r.describe(&RawCounter::new(c, row, i as u8, "aie")))
            .collect();

        let groups = group_by_tile(&counters);
        assert_eq!(
            groups,
            vec![
                TileGroup { tile: Tile::new(1, 2), counters: vec![0, 2] },
                TileGroup { tile: Tile::new(0, 2), counters: vec![1, 4] },
                TileGroup { tile: Tile::new(0, 3), counters: vec![3] },
            ]
        );
    }

    #[test]
    fn test_counter_metadata_fields() {
        let r = resolver();
        let core = r.describe(&RawCounter::new(0, 2, 0, "aie"));
        let shim = r.describe(&RawCounter::new(0, 0, 1, "interface_tile").with_payload(1 << 8));
        let bare = r.describe(&RawCounter::new(3, 4, 2, "aie_memory"));
        assert_eq!(shim.port_direction, PortDirection::Output);

        let mut out = String::new();
        push_counter_metadata(&mut out, &core).unwrap();
        assert_eq!(
            out,
            "        {\"column\": 0, \"row\": 2, \"counter\": 0, \"module\": \"aie\", \
             \"address\": \"0x0000237520\", \"metric_set\": \"heat_map\"}"
        );

        out.clear();
        push_counter_metadata(&mut out, &shim).unwrap();
        assert!(out.ends_with(
            "\"metric_set\": \"read_bandwidth\", \"port_direction\": \"output\"}"
        ));

        out.clear();
        push_counter_metadata(&mut out, &bare).unwrap();
        assert!(!out.contains("metric_set"));
        assert!(!out.contains("port_direction"));
    }

    #[test]
    fn test_render_skips_empty_blocks() {
        let r = resolver();
        let counters = vec![r.describe(&RawCounter::new(0, 2, 0, "aie"))];
        let no_lines = record(0, &[]);
        let no_counters = record(1, &[5]);
        let blocks = [
            ProbeBlock::new(&no_lines, counters.clone()),
            ProbeBlock::new(&no_counters, Vec::new()),
        ];

        let script = ScriptEmitter::default().render(&blocks, &counters);
        assert!(!script.contains("jprobe:"));
        assert!(script.contains("\"counter_metadata\": [\n        {\"column\": 0"));
        assert!(script.starts_with("# Auto-generated CT file for AIE Profile counters\n"));
        assert!(script.ends_with("@blockclose\n}\n"));
    }

    #[test]
    fn test_render_probe_block() {
        let r = resolver();
        let counters = vec![
            r.describe(&RawCounter::new(1, 2, 0, "aie")),
            r.describe(&RawCounter::new(2, 2, 0, "aie")),
            r.describe(&RawCounter::new(1, 2, 1, "aie")),
        ];
        let rec = record(0, &[6, 8, 293]);
        let blocks = [ProbeBlock::new(&rec, counters.clone())];

        let script = ScriptEmitter::default().render(&blocks, &counters);
        let expected = "\
# Probes for aie_runtime_control0.asm (columns 0-3)
jprobe:aie_runtime_control0.asm:uc0:line6,8,293
{
    ts = timestamp32()
    ctr_0 = read_reg(0x0002237520)
    ctr_1 = read_reg(0x0004237520)
    ctr_2 = read_reg(0x0002237524)
    print(f\"Probe fired: ts={ts}\")
@blockopen
profile_data[\"probes\"].append({
    \"asm_file\": \"aie_runtime_control0.asm\",
    \"timestamp\": ts,
    \"tiles\": [
        {\"col\": 1, \"row\": 2, \"counters\": [ctr_0, ctr_2]},
        {\"col\": 2, \"row\": 2, \"counters\": [ctr_1]}
    ]
})
@blockclose
}

end
";
        assert!(script.contains(expected), "unexpected script:\n{script}");
    }

    #[test]
    fn test_render_custom_config() {
        let config = ScriptConfig::default()
            .with_title("Counter Trace")
            .with_results_file("counters.json")
            .with_banner(Vec::<String>::new());
        let script = ScriptEmitter::new(config).render(&[], &[]);
        assert!(script.starts_with("begin\n{\n"));
        assert!(script.contains("print(\"\\nCounter Trace tracing started\\n\")"));
        assert!(script.contains("os.path.join(os.getcwd(), \"counters.json\")"));
        assert!(script.contains("\"counter_metadata\": [\n    ],"));
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("aie"), "aie");
        assert_eq!(escape(r#"a"b\c"#), r#"a\"b\\c"#);
    }

    #[test]
    fn test_write_and_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aie_profile.ct");
        let emitter = ScriptEmitter::default();

        emitter.write(&path, &[], &[]).unwrap();
        let first = std::fs::read_to_string(&path).unwrap();
        emitter.write(&path, &[], &[]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), first);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("aie_profile.ct");
        let err = ScriptEmitter::default().write(&path, &[], &[]).unwrap_err();
        assert!(matches!(err, EmitError::Create { .. }));
        assert!(!path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_write_new_file_mode_matches_plain_create() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aie_profile.ct");
        let plain = dir.path().join("plain.txt");
        ScriptEmitter::default().write(&path, &[], &[]).unwrap();
        std::fs::write(&plain, "x").unwrap();

        let mode = |p: &Path| std::fs::metadata(p).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(&path), mode(&plain));
    }

    #[cfg(unix)]
    #[test]
    fn test_write_keeps_existing_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aie_profile.ct");
        std::fs::write(&path, "previous\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o640)).unwrap();

        ScriptEmitter::default().write(&path, &[], &[]).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
        assert!(std::fs::read_to_string(&path).unwrap().starts_with("# Auto-generated"));
    }

    #[test]
    fn test_render_escapes_title() {
        let config = ScriptConfig::default().with_title(r#"AIE "Profile""#);
        let script = ScriptEmitter::new(config).render(&[], &[]);
        assert!(script.contains(r#"print("\nAIE \"Profile\" tracing started\n")"#));
        assert!(script.contains(r#"print("\nAIE \"Profile\" tracing ended\n")"#));
    }
}
