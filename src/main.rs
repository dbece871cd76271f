//! 푸앵카레 임베딩 학습 CLI

use std::path::PathBuf;

use anyhow::Result;
use clap::{value_parser, Arg, ArgAction, Command};

use poincare_embed::{PoincareTrainer, TrainConfig, NEGATIVE_TABLE_SIZE};

fn main() -> Result<()> {
    env_logger::init();

    let matches = Command::new("poincare-embed")
        .version("0.1.0")
        .about("유향 그래프 노드의 푸앵카레(쌍곡) 임베딩 학습 도구")
        .arg(
            Arg::new("graph")
                .long("graph")
                .required(true)
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("학습 그래프 파일 경로 (source<TAB>target 간선 목록)"),
        )
        .arg(
            Arg::new("output-vectors")
                .long("output-vectors")
                .required(true)
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("학습된 벡터 저장 경로"),
        )
        .arg(
            Arg::new("input-vectors")
                .long("input-vectors")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("초기화용 벡터 파일 경로 (선택, 볼 좌표)"),
        )
        .arg(
            Arg::new("retraction-updates")
                .long("retraction-updates")
                .action(ArgAction::SetTrue)
                .help("Nickel & Kiela 방식 리트랙션 업데이트 사용 (기본: 측지선 업데이트)"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("진행률 표시"),
        )
        .arg(
            Arg::new("start-lr")
                .long("start-lr")
                .value_name("LR")
                .value_parser(value_parser!(f64))
                .default_value("0.05")
                .help("시작 학습률"),
        )
        .arg(
            Arg::new("end-lr")
                .long("end-lr")
                .value_name("LR")
                .value_parser(value_parser!(f64))
                .default_value("0.05")
                .help("종료 학습률"),
        )
        .arg(
            Arg::new("dimension")
                .long("dimension")
                .value_name("DIM")
                .value_parser(value_parser!(usize))
                .default_value("100")
                .help("다양체 차원"),
        )
        .arg(
            Arg::new("max-step-size")
                .long("max-step-size")
                .value_name("DIST")
                .value_parser(value_parser!(f64))
                .default_value("2")
                .help("한 업데이트의 최대 쌍곡 거리"),
        )
        .arg(
            Arg::new("init-std-dev")
                .long("init-std-dev")
                .value_name("STD")
                .value_parser(value_parser!(f64))
                .default_value("0.1")
                .help("초기화 시 기준점으로부터의 쌍곡 거리 표준편차"),
        )
        .arg(
            Arg::new("epochs")
                .long("epochs")
                .value_name("N")
                .value_parser(value_parser!(usize))
                .default_value("5")
                .help("에포크 수"),
        )
        .arg(
            Arg::new("number-negatives")
                .long("number-negatives")
                .value_name("N")
                .value_parser(value_parser!(usize))
                .default_value("5")
                .help("간선당 샘플링할 네거티브 수"),
        )
        .arg(
            Arg::new("distribution-power")
                .long("distribution-power")
                .value_name("P")
                .value_parser(value_parser!(f64))
                .default_value("1")
                .help("네거티브 샘플링 분포에 적용할 지수"),
        )
        .arg(
            Arg::new("checkpoint-interval")
                .long("checkpoint-interval")
                .value_name("N")
                .value_parser(value_parser!(i32))
                .allow_negative_numbers(true)
                .default_value("-1")
                .help("이 에포크 수마다 벡터 저장 (양수가 아니면 비활성)"),
        )
        .arg(
            Arg::new("threads")
                .long("threads")
                .value_name("N")
                .value_parser(value_parser!(usize))
                .default_value("1")
                .help("워커 스레드 수 (0이면 논리 코어 수만큼)"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_name("SEED")
                .value_parser(value_parser!(u64))
                .default_value("1")
                .help("난수 시드 (단일 스레드일 때만 결정적)"),
        )
        .get_matches();

    let threads = match *matches.get_one::<usize>("threads").expect("기본값 있음") {
        0 => num_cpus::get(),
        n => n,
    };

    let config = TrainConfig {
        graph: matches.get_one::<PathBuf>("graph").expect("필수 인자").clone(),
        output_vectors: matches
            .get_one::<PathBuf>("output-vectors")
            .expect("필수 인자")
            .clone(),
        input_vectors: matches.get_one::<PathBuf>("input-vectors").cloned(),
        additive_updates: matches.get_flag("retraction-updates"),
        verbose: matches.get_flag("verbose"),
        start_lr: *matches.get_one::<f64>("start-lr").expect("기본값 있음"),
        end_lr: *matches.get_one::<f64>("end-lr").expect("기본값 있음"),
        max_step_size: *matches.get_one::<f64>("max-step-size").expect("기본값 있음"),
        dimension: *matches.get_one::<usize>("dimension").expect("기본값 있음"),
        checkpoint_interval: *matches
            .get_one::<i32>("checkpoint-interval")
            .expect("기본값 있음"),
        distribution_power: *matches
            .get_one::<f64>("distribution-power")
            .expect("기본값 있음"),
        epochs: *matches.get_one::<usize>("epochs").expect("기본값 있음"),
        number_negatives: *matches
            .get_one::<usize>("number-negatives")
            .expect("기본값 있음"),
        threads,
        init_std_dev: *matches.get_one::<f64>("init-std-dev").expect("기본값 있음"),
        seed: *matches.get_one::<u64>("seed").expect("기본값 있음"),
        negative_table_size: NEGATIVE_TABLE_SIZE,
    };
    log::debug!("학습 설정: {}", serde_json::to_string(&config)?);

    let mut trainer = PoincareTrainer::new(config.clone())?;
    trainer.train()?;
    trainer.save_vectors(&config.output_vectors)?;
    Ok(())
}
