use std::io::Cursor;
use std::path::PathBuf;

use approx::assert_relative_eq;

use crate::core::config::TrainConfig;
use crate::core::digraph::Digraph;
use crate::core::trainer::{format_objective, PoincareTrainer};
use crate::core::vector::minkowski_dot;

const GRAPH_FIXTURE: &str =
    "car\tvehicle\nvehicle\tthing\npotato\tthing\ncat\tmammal\nmammal\tthing";

fn fixture_digraph() -> Digraph {
    Digraph::from_reader(Cursor::new(GRAPH_FIXTURE)).unwrap()
}

/// 단일 스레드 테스트용 설정. 네거티브 1개: 고정 그래프에서는 소스와
/// 제외 집합을 빼고도 잠글 수 있는 후보가 항상 남도록 하기 위함.
fn fixture_config() -> TrainConfig {
    TrainConfig {
        graph: PathBuf::from("unused"),
        output_vectors: PathBuf::from("unused"),
        dimension: 5,
        epochs: 2,
        number_negatives: 1,
        negative_table_size: 10_000,
        seed: 7,
        ..TrainConfig::default()
    }
}

#[test]
fn 초기화는_시드에_대해_결정적() {
    let trainer_a = PoincareTrainer::from_digraph(fixture_config(), fixture_digraph()).unwrap();
    let trainer_b = PoincareTrainer::from_digraph(fixture_config(), fixture_digraph()).unwrap();
    for id in 0..trainer_a.digraph().node_count() {
        assert_eq!(
            trainer_a.vector(id).as_slice(),
            trainer_b.vector(id).as_slice()
        );
    }
}

#[test]
fn 시드가_다르면_초기화가_다름() {
    let config_a = fixture_config();
    let config_b = TrainConfig {
        seed: 8,
        ..fixture_config()
    };
    let trainer_a = PoincareTrainer::from_digraph(config_a, fixture_digraph()).unwrap();
    let trainer_b = PoincareTrainer::from_digraph(config_b, fixture_digraph()).unwrap();
    assert_ne!(trainer_a.vector(0).as_slice(), trainer_b.vector(0).as_slice());
}

#[test]
fn 단일_스레드_학습은_결정적() {
    let mut trainer_a = PoincareTrainer::from_digraph(fixture_config(), fixture_digraph()).unwrap();
    let mut trainer_b = PoincareTrainer::from_digraph(fixture_config(), fixture_digraph()).unwrap();
    trainer_a.train().unwrap();
    trainer_b.train().unwrap();
    assert_eq!(trainer_a.performance(), trainer_b.performance());
    for id in 0..trainer_a.digraph().node_count() {
        assert_eq!(
            trainer_a.vector(id).as_slice(),
            trainer_b.vector(id).as_slice(),
            "노드 {}의 임베딩이 달라짐",
            id
        );
    }
}

#[test]
fn 학습_후에도_모든_벡터가_하이퍼볼로이드_위() {
    let mut trainer = PoincareTrainer::from_digraph(fixture_config(), fixture_digraph()).unwrap();
    trainer.train().unwrap();
    for id in 0..trainer.digraph().node_count() {
        let vector = trainer.vector(id);
        assert!(vector.as_slice().iter().all(|c| c.is_finite()));
        assert_relative_eq!(minkowski_dot(&vector, &vector), -1.0, epsilon = 1e-9);
    }
}

#[test]
fn 학습은_벡터를_움직이고_유효한_목적값을_남김() {
    let mut trainer = PoincareTrainer::from_digraph(fixture_config(), fixture_digraph()).unwrap();
    let before = trainer.vector(0);
    trainer.train().unwrap();
    assert_ne!(trainer.vector(0).as_slice(), before.as_slice());
    // 평균 목적값은 소프트맥스 비율이므로 [0, 1] 범위
    assert!(trainer.performance() >= 0.0 && trainer.performance() <= 1.0);
}

#[test]
fn 멀티_스레드_학습_스모크() {
    // 네거티브 2개 + 스레드 2개가 항상 잠글 후보를 찾을 수 있도록
    // 노드가 넉넉한 사슬 그래프 사용
    let mut edges = String::new();
    for i in 0..19 {
        edges.push_str(&format!("n{}\tn{}\n", i, i + 1));
    }
    let digraph = Digraph::from_reader(Cursor::new(edges)).unwrap();
    let config = TrainConfig {
        threads: 2,
        number_negatives: 2,
        epochs: 1,
        ..fixture_config()
    };
    let mut trainer = PoincareTrainer::from_digraph(config, digraph).unwrap();
    trainer.train().unwrap();
    for id in 0..trainer.digraph().node_count() {
        let vector = trainer.vector(id);
        assert!(vector.as_slice().iter().all(|c| c.is_finite()));
        assert_relative_eq!(minkowski_dot(&vector, &vector), -1.0, epsilon = 1e-9);
    }
}

#[test]
fn 리트랙션_모드_학습_스모크() {
    let config = TrainConfig {
        additive_updates: true,
        ..fixture_config()
    };
    let mut trainer = PoincareTrainer::from_digraph(config, fixture_digraph()).unwrap();
    trainer.train().unwrap();
    for id in 0..trainer.digraph().node_count() {
        let vector = trainer.vector(id);
        assert_relative_eq!(minkowski_dot(&vector, &vector), -1.0, epsilon = 1e-9);
    }
}

#[test]
fn 빈_그래프도_학습_가능() {
    let digraph = Digraph::from_reader(Cursor::new("")).unwrap();
    let mut trainer = PoincareTrainer::from_digraph(fixture_config(), digraph).unwrap();
    trainer.train().unwrap();
    assert_eq!(trainer.performance(), 0.0);
}

#[test]
fn 잘못된_설정은_트레이너_생성_거부() {
    let config = TrainConfig {
        dimension: 0,
        ..fixture_config()
    };
    assert!(PoincareTrainer::from_digraph(config, fixture_digraph()).is_err());
}

#[test]
fn 목적값_표기는_유효숫자_3자리() {
    assert_eq!(format_objective(0.0), "0");
    assert_eq!(format_objective(0.5), "0.5");
    assert_eq!(format_objective(1.0), "1");
    assert_eq!(format_objective(0.123456), "0.123");
    assert_eq!(format_objective(0.9999), "1");
    assert_eq!(format_objective(0.000123456), "0.000123");
    assert_eq!(format_objective(0.25), "0.25");
}
