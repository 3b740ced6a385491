#[cfg(test)]
mod pipeline_tests {
    use std::borrow::Cow;
    use std::fs::{self, File};
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    use etherparse::PacketBuilder;
    use pcap_file::pcap::{PcapHeader, PcapPacket, PcapWriter, RawPcapPacket};
    use pcap_file::DataLink;
    use tempfile::TempDir;

    use netsim_metrics::analysis::{self, decode, types::*};
    use netsim_metrics::config::{AnalysisConfig, ErrorPolicy, ScenarioSource, TraceSource};
    use netsim_metrics::discovery::{self, Discovery};

    /// Ethernet/IPv4/UDP frame padded with `payload_len` zero bytes
    fn udp_frame(payload_len: usize) -> Vec<u8> {
        let builder = PacketBuilder::ethernet2([1, 2, 3, 4, 5, 6], [7, 8, 9, 10, 11, 12])
            .ipv4([10, 1, 1, 1], [10, 1, 1, 2], 64)
            .udp(49153, 9);
        let payload = vec![0u8; payload_len];
        let mut frame = Vec::with_capacity(builder.size(payload.len()));
        builder.write(&mut frame, &payload).unwrap();
        frame
    }

    fn arp_frame() -> Vec<u8> {
        let mut frame = vec![0xffu8; 12];
        frame.extend_from_slice(&[0x08, 0x06]);
        frame.extend_from_slice(&[0u8; 28]);
        frame
    }

    /// Write a pcap file with the given (milliseconds, frame) records
    fn write_capture(path: &Path, datalink: DataLink, frames: &[(u64, Vec<u8>)]) {
        let header = PcapHeader {
            datalink,
            ..Default::default()
        };
        let file = File::create(path).unwrap();
        let mut writer = PcapWriter::with_header(file, header).unwrap();
        for (millis, data) in frames {
            let packet = PcapPacket::new(Duration::from_millis(*millis), data.len() as u32, data);
            writer.write_packet(&packet).unwrap();
        }
    }

    /// Two scenarios sharing one trace file: "fast" and "slow"
    fn fixture() -> (TempDir, AnalysisConfig) {
        let dir = TempDir::new().unwrap();
        let pcap_dir = dir.path().join("pcap_files");
        fs::create_dir(&pcap_dir).unwrap();

        // 100-byte frames
        let frame = udp_frame(58);
        assert_eq!(frame.len(), 100);

        write_capture(
            &pcap_dir.join("fast.pcap"),
            DataLink::ETHERNET,
            &[(0, frame.clone()), (200, arp_frame()), (500, frame.clone()), (1000, frame.clone())],
        );
        write_capture(
            &pcap_dir.join("slow.pcap"),
            DataLink::ETHERNET,
            &[(0, frame.clone()), (2000, frame.clone()), (9000, arp_frame())],
        );

        let trace = dir.path().join("Flying3D.tr");
        fs::write(&trace, "+ 0.1 /NodeList/0\n- 0.2 /NodeList/0\nr 0.3 /NodeList/1\n+ 0.4 /NodeList/0\n").unwrap();

        let config = AnalysisConfig {
            capture_source: Some(pcap_dir),
            trace_source: Some(TraceSource::Shared(trace)),
            ..Default::default()
        };
        (dir, config)
    }

    fn discovered(config: &AnalysisConfig) -> Vec<ScenarioSource> {
        match discovery::resolve_scenarios(config).unwrap() {
            Discovery::Found(scenarios) => scenarios,
            Discovery::NoArtifacts(reason) => panic!("no artifacts: {}", reason),
        }
    }

    #[test]
    fn test_read_capture_file() {
        let (_dir, config) = fixture();
        let path = config.capture_source.as_ref().unwrap().join("fast.pcap");
        let packets = decode::read_capture_file(&path).unwrap();

        assert_eq!(packets.len(), 4);
        assert_eq!(packets[1].timestamp, 0.2);
        assert!(packets[0].has_layer(Protocol::Udp));
        assert!(packets[1].has_layer(Protocol::Arp));
        assert!(!packets[1].has_layer(Protocol::Ipv4));
        assert_eq!(packets[3].length, 100);
    }

    #[test]
    fn test_full_comparison() {
        let (_dir, config) = fixture();
        let scenarios = discovered(&config);
        let report = analysis::run_comparison(&scenarios, &config).unwrap();

        assert_eq!(report.metadata.scenario_count, 2);
        assert!(report.skipped.is_empty());

        let fast = &report.scenarios[0];
        assert_eq!(fast.scenario, "fast");
        assert_eq!(fast.packet_count, 3);
        assert_eq!(fast.total_bytes, 300);
        assert_eq!(fast.throughput_mbps, 300.0 * 8.0 / (1.0 * 1e6));
        assert_eq!(fast.average_latency, 1.0 / 3.0);
        assert_eq!(fast.pdr, 50.0);
        assert_eq!(fast.packet_loss, 50.0);

        let slow = &report.scenarios[1];
        assert_eq!(slow.scenario, "slow");
        assert_eq!(slow.packet_count, 2);
        assert_eq!(slow.throughput_mbps, 200.0 * 8.0 / (2.0 * 1e6));
        assert_eq!(slow.average_latency, 1.0);

        let normalized = &report.normalized;
        assert_eq!(normalized.throughput.get("fast"), Some(1.0));
        assert_eq!(normalized.throughput.get("slow"), Some(0.0));
        assert_eq!(normalized.latency.get("fast"), Some(0.0));
        assert_eq!(normalized.latency.get("slow"), Some(1.0));
        // Shared trace: identical PDR everywhere
        assert_eq!(normalized.pdr.get("fast"), Some(0.0));
        assert_eq!(normalized.pdr.get("slow"), Some(0.0));
    }

    #[test]
    fn test_arp_filter() {
        let (_dir, mut config) = fixture();
        config.protocol_filter = Protocol::Arp;
        let scenarios = discovered(&config);
        let report = analysis::run_comparison(&scenarios, &config).unwrap();

        assert_eq!(report.scenarios[0].packet_count, 1);
        assert_eq!(report.scenarios[0].total_bytes, 42);
        assert_eq!(report.scenarios[1].packet_count, 1);
    }

    #[test]
    fn test_pipeline_is_idempotent() {
        let (_dir, config) = fixture();
        let scenarios = discovered(&config);

        let first = analysis::run_comparison(&scenarios, &config).unwrap();
        let second = analysis::run_comparison(&scenarios, &config).unwrap();

        assert_eq!(first.scenarios, second.scenarios);
        assert_eq!(first.normalized, second.normalized);
    }

    #[test]
    fn test_scenario_order_does_not_change_values() {
        let (_dir, config) = fixture();
        let scenarios = discovered(&config);
        let mut reversed = scenarios.clone();
        reversed.reverse();

        let forward = analysis::run_comparison(&scenarios, &config).unwrap();
        let backward = analysis::run_comparison(&reversed, &config).unwrap();

        assert_eq!(backward.scenarios[0].scenario, "slow");
        for metrics in &forward.scenarios {
            let other = backward
                .scenarios
                .iter()
                .find(|m| m.scenario == metrics.scenario)
                .unwrap();
            assert_eq!(metrics, other);
            for dim in forward.normalized.dimensions() {
                let other_dim = backward.normalized.dimension(dim.metric).unwrap();
                assert_eq!(dim.get(&metrics.scenario), other_dim.get(&metrics.scenario));
            }
        }
    }

    #[test]
    fn test_corrupt_capture_is_skipped() {
        let (_dir, config) = fixture();
        let pcap_dir = config.capture_source.clone().unwrap();
        fs::write(pcap_dir.join("broken.pcap"), b"definitely not a pcap file").unwrap();

        let scenarios = discovered(&config);
        assert_eq!(scenarios.len(), 3);

        let report = analysis::run_comparison(&scenarios, &config).unwrap();
        assert_eq!(report.metadata.scenario_count, 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].scenario, "broken");
        assert_eq!(report.normalized.scenario_count(), 2);
    }

    #[test]
    fn test_corrupt_capture_aborts() {
        let (_dir, mut config) = fixture();
        config.error_policy = ErrorPolicy::Abort;
        let pcap_dir = config.capture_source.clone().unwrap();
        fs::write(pcap_dir.join("broken.pcap"), b"definitely not a pcap file").unwrap();

        let scenarios = discovered(&config);
        assert!(analysis::run_comparison(&scenarios, &config).is_err());
    }

    #[test]
    fn test_missing_trace_is_skipped() {
        let (_dir, mut config) = fixture();
        config.trace_source = Some(TraceSource::PerScenario(PathBuf::from("/nonexistent/traces")));
        let scenarios = discovered(&config);
        let report = analysis::run_comparison(&scenarios, &config).unwrap();
        assert!(report.scenarios.is_empty());
        assert_eq!(report.skipped.len(), 2);
        assert_eq!(report.normalized.scenario_count(), 0);
    }

    #[test]
    fn test_header_only_capture() {
        let dir = TempDir::new().unwrap();
        let capture = dir.path().join("empty.pcap");
        write_capture(&capture, DataLink::ETHERNET, &[]);
        let trace = dir.path().join("empty.tr");
        fs::write(&trace, "").unwrap();

        let source = ScenarioSource {
            name: "empty".to_string(),
            capture,
            trace,
        };
        let metrics = analysis::pipeline::analyze_scenario(&source, Protocol::Ipv4, &TraceMarkers::default()).unwrap();

        assert_eq!(metrics.packet_count, 0);
        assert!(!metrics.has_measurement);
        assert_eq!(metrics.average_latency, 0.0);
        assert_eq!(metrics.pdr, 0.0);
        assert_eq!(metrics.throughput_mbps, 0.0);
    }

    #[test]
    fn test_radiotap_capture() {
        let dir = TempDir::new().unwrap();
        let capture = dir.path().join("Flying3D-0-0.pcap");

        let ip = udp_frame(58)[14..].to_vec();
        let mut frame = vec![0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00];
        let mut wifi_header = vec![0u8; 24];
        wifi_header[0] = 0x08;
        frame.extend_from_slice(&wifi_header);
        frame.extend_from_slice(&[0xaa, 0xaa, 0x03, 0x00, 0x00, 0x00, 0x08, 0x00]);
        frame.extend_from_slice(&ip);

        let mut beacon = vec![0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00];
        beacon.extend_from_slice(&[0x80; 40]);

        write_capture(
            &capture,
            DataLink::IEEE802_11_RADIOTAP,
            &[(1000, frame.clone()), (1500, beacon), (3000, frame.clone())],
        );

        let packets = decode::read_capture_file(&capture).unwrap();
        let summary = analysis::analyze_capture(&packets, Protocol::Ipv4);
        assert_eq!(summary.packet_count, 2);
        assert_eq!(summary.total_bytes, 2 * frame.len() as u64);
        assert_eq!(summary.duration, 2.0);
    }

    #[test]
    fn test_snaplen_limited_capture() {
        let dir = TempDir::new().unwrap();
        let capture = dir.path().join("snapped.pcap");

        // 1442 bytes on the wire, only the first 96 stored
        let frame = udp_frame(1400);
        assert_eq!(frame.len(), 1442);
        let header = PcapHeader {
            snaplen: 96,
            datalink: DataLink::ETHERNET,
            ..Default::default()
        };
        let mut writer = PcapWriter::with_header(File::create(&capture).unwrap(), header).unwrap();
        for millis in [0u64, 1000] {
            let packet = PcapPacket::new(Duration::from_millis(millis), frame.len() as u32, &frame[..96]);
            writer.write_packet(&packet).unwrap();
        }
        drop(writer);

        let packets = decode::read_capture_file(&capture).unwrap();
        assert_eq!(packets.len(), 2);
        assert!(packets.iter().all(|p| p.length == 96));
        assert!(packets[0].has_layer(Protocol::Ipv4));

        let summary = analysis::analyze_capture(&packets, Protocol::Ipv4);
        assert_eq!(summary.packet_count, 2);
        assert_eq!(summary.total_bytes, 192);
        assert_eq!(summary.duration, 1.0);
    }

    #[test]
    fn test_record_longer_than_original_is_rejected() {
        let dir = TempDir::new().unwrap();
        let capture = dir.path().join("inconsistent.pcap");

        let frame = udp_frame(58);
        let mut writer = PcapWriter::new(File::create(&capture).unwrap()).unwrap();
        let raw = RawPcapPacket {
            ts_sec: 1,
            ts_frac: 0,
            incl_len: frame.len() as u32,
            orig_len: 60,
            data: Cow::Borrowed(&frame[..]),
        };
        writer.write_raw_packet(&raw).unwrap();
        drop(writer);

        assert!(matches!(
            decode::read_capture_file(&capture),
            Err(ParseError::Capture { .. })
        ));
    }

    #[test]
    fn test_no_artifacts() {
        let dir = TempDir::new().unwrap();
        let config = AnalysisConfig {
            capture_source: Some(dir.path().to_path_buf()),
            trace_source: Some(TraceSource::Shared(dir.path().join("missing.tr"))),
            ..Default::default()
        };
        assert!(matches!(
            discovery::resolve_scenarios(&config).unwrap(),
            Discovery::NoArtifacts(_)
        ));
    }
}
