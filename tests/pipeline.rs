#![deny(rust_2018_idioms)]

mod support;
pub use self::support::*;

fn staged() -> Config {
    Config::default().with_schedule(Schedule::Staged)
}

fn schedules() -> Vec<Config> {
    vec![Config::default(), staged()]
}

#[tokio::test]
async fn succeeds_when_every_stage_succeeds() {
    for config in schedules() {
        let mut env = MockExecEnv::new();
        assert_eq!(Ok(EXIT_SUCCESS), run_with(&mut env, &config, &[]).await);
        assert_eq!(vec!["printenv", "cat", "sort", "less"], env.attempted());
    }
}

#[tokio::test]
async fn forwards_arguments_to_grep_verbatim() {
    let mut env = MockExecEnv::new();
    let args = ["-i", "--", "-path", ""];

    assert_eq!(Ok(EXIT_SUCCESS), run_with(&mut env, &Config::default(), &args).await);

    let grep = &env.attempts[1];
    assert_eq!("grep", grep.name);
    assert_eq!(args.to_vec(), grep.args);
    for stage in &[&env.attempts[0], &env.attempts[2], &env.attempts[3]] {
        assert!(stage.args.is_empty(), "{} got arguments", stage.name);
    }
}

#[tokio::test]
async fn wires_stages_together() {
    for config in schedules() {
        let mut env = MockExecEnv::new();
        run_with(&mut env, &config, &["PATH"]).await.unwrap();

        let wiring: Vec<_> = env
            .attempts
            .iter()
            .map(|s| (s.has_stdin, s.has_stdout))
            .collect();
        // The first stage reads, and the last stage writes, whatever the
        // launcher was given; everything in between goes through pipes.
        assert_eq!(
            vec![(false, true), (true, true), (true, true), (true, false)],
            wiring
        );
    }
}

#[tokio::test]
async fn source_failure_is_propagated() {
    for config in schedules() {
        let mut env = MockExecEnv::new().exits("printenv", ExitStatus::Code(1));
        assert_eq!(Ok(ExitStatus::Code(1)), run_with(&mut env, &config, &[]).await);
    }
}

#[tokio::test]
async fn staged_source_failure_spawns_nothing_downstream() {
    let mut env = MockExecEnv::new().exits("printenv", ExitStatus::Code(1));
    assert_eq!(Ok(ExitStatus::Code(1)), run_with(&mut env, &staged(), &["PATH"]).await);
    assert_eq!(vec!["printenv"], env.attempted());
}

#[tokio::test]
async fn source_failure_wins_over_later_failures() {
    let mut env = MockExecEnv::new()
        .exits("printenv", ExitStatus::Code(1))
        .exits("sort", ExitStatus::Code(2))
        .exits("less", ExitStatus::Code(3));

    assert_eq!(
        Ok(ExitStatus::Code(1)),
        run_with(&mut env, &Config::default(), &[]).await
    );
}

#[tokio::test]
async fn stages_after_a_failure_are_waited_for() {
    let mut env = MockExecEnv::new().exits("grep", ExitStatus::Code(2));
    assert_eq!(
        Ok(ExitStatus::Code(2)),
        run_with(&mut env, &Config::default(), &["--no-such-option"]).await
    );
    assert_eq!(vec!["printenv", "grep", "sort", "less"], env.finished());

    let mut env = MockExecEnv::new()
        .exits("printenv", ExitStatus::Code(1))
        .exits("sort", ExitStatus::Signal(libc::SIGKILL));
    assert_eq!(
        Ok(ExitStatus::Code(1)),
        run_with(&mut env, &Config::default(), &[]).await
    );
    assert_eq!(vec!["printenv", "cat", "sort", "less"], env.finished());
}

#[tokio::test]
async fn grep_without_matches_does_not_abort() {
    for config in schedules() {
        let mut env = MockExecEnv::new().exits("grep", ExitStatus::Code(GREP_FAILURE_THRESHOLD));
        assert_eq!(Ok(EXIT_SUCCESS), run_with(&mut env, &config, &["NOPE"]).await);
        assert_eq!(vec!["printenv", "grep", "sort", "less"], env.attempted());
    }
}

#[tokio::test]
async fn grep_errors_are_propagated() {
    for config in schedules() {
        let mut env = MockExecEnv::new().exits("grep", ExitStatus::Code(2));
        assert_eq!(Ok(ExitStatus::Code(2)), run_with(&mut env, &config, &["-Q"]).await);
    }

    let mut env = MockExecEnv::new().exits("grep", ExitStatus::Code(2));
    run_with(&mut env, &staged(), &["-Q"]).await.unwrap();
    assert_eq!(vec!["printenv", "grep"], env.attempted());
}

#[tokio::test]
async fn cat_fails_on_any_nonzero_code() {
    for config in schedules() {
        let mut env = MockExecEnv::new().exits("cat", ExitStatus::Code(1));
        assert_eq!(Ok(ExitStatus::Code(1)), run_with(&mut env, &config, &[]).await);
    }
}

#[tokio::test]
async fn sort_tolerates_exit_code_one() {
    let mut env = MockExecEnv::new().exits("sort", ExitStatus::Code(1));
    assert_eq!(Ok(EXIT_SUCCESS), run_with(&mut env, &Config::default(), &[]).await);

    let mut env = MockExecEnv::new().exits("sort", ExitStatus::Code(2));
    assert_eq!(
        Ok(ExitStatus::Code(2)),
        run_with(&mut env, &Config::default(), &[]).await
    );
}

#[tokio::test]
async fn presenter_exit_code_is_the_result() {
    for config in schedules() {
        let mut env = MockExecEnv::new().exits("less", ExitStatus::Code(42));
        assert_eq!(Ok(ExitStatus::Code(42)), run_with(&mut env, &config, &[]).await);
    }
}

#[tokio::test]
async fn abnormal_termination_is_fatal() {
    let killed = ExitStatus::Signal(libc::SIGKILL);

    for config in schedules() {
        let mut env = MockExecEnv::new().exits("sort", killed);
        assert_eq!(
            Err(PipelineError::Abnormal(StageKind::Order, killed)),
            run_with(&mut env, &config, &[]).await
        );
    }

    // Not even grep's lenient threshold applies to signals.
    let mut env = MockExecEnv::new().exits("grep", killed);
    assert_eq!(
        Err(PipelineError::Abnormal(StageKind::Filter, killed)),
        run_with(&mut env, &Config::default(), &["PATH"]).await
    );
}

#[tokio::test]
async fn broken_pipe_defers_to_the_failing_consumer() {
    let broken = ExitStatus::Signal(libc::SIGPIPE);

    let mut env = MockExecEnv::new()
        .exits("printenv", broken)
        .exits("grep", ExitStatus::Code(2));
    assert_eq!(
        Ok(ExitStatus::Code(2)),
        run_with(&mut env, &Config::default(), &["-Q"]).await
    );

    let mut env = MockExecEnv::new()
        .exits("sort", broken)
        .exits("less", ExitStatus::Signal(libc::SIGTERM));
    assert_eq!(
        Err(PipelineError::Abnormal(
            StageKind::Present,
            ExitStatus::Signal(libc::SIGTERM)
        )),
        run_with(&mut env, &Config::default(), &[]).await
    );
}

#[tokio::test]
async fn broken_pipe_without_other_failures_is_fatal() {
    let broken = ExitStatus::Signal(libc::SIGPIPE);

    let mut env = MockExecEnv::new()
        .exits("printenv", broken)
        .exits("cat", broken);
    assert_eq!(
        Err(PipelineError::Abnormal(StageKind::Source, broken)),
        run_with(&mut env, &Config::default(), &[]).await
    );

    let mut env = MockExecEnv::new().exits("printenv", broken);
    assert_eq!(
        Err(PipelineError::Abnormal(StageKind::Source, broken)),
        run_with(&mut env, &staged(), &[]).await
    );
}

#[tokio::test]
async fn configured_pager_is_preferred() {
    let config = Config::default().with_pager("most");
    let mut env = MockExecEnv::new().exits("most", EXIT_SUCCESS);

    assert_eq!(Ok(EXIT_SUCCESS), run_with(&mut env, &config, &[]).await);
    assert_eq!(vec!["printenv", "cat", "sort", "most"], env.attempted());
}

#[tokio::test]
async fn missing_pager_falls_back_in_order() {
    let config = Config::default().with_pager("most");

    let mut env = MockExecEnv::new();
    assert_eq!(Ok(EXIT_SUCCESS), run_with(&mut env, &config, &[]).await);
    assert_eq!(vec!["printenv", "cat", "sort", "most", "less"], env.attempted());

    let mut env = MockExecEnv::new().without("less");
    assert_eq!(Ok(EXIT_SUCCESS), run_with(&mut env, &config, &[]).await);
    assert_eq!(
        vec!["printenv", "cat", "sort", "most", "less", "more"],
        env.attempted()
    );

    // Every attempt still gets the sorted stream.
    assert!(env.attempts[3..].iter().all(|s| s.has_stdin && !s.has_stdout));
}

#[tokio::test]
async fn default_pager_falls_back_to_more() {
    let mut env = MockExecEnv::new().without("less");

    assert_eq!(Ok(EXIT_SUCCESS), run_with(&mut env, &Config::default(), &[]).await);
    assert_eq!(vec!["printenv", "cat", "sort", "less", "more"], env.attempted());
}

#[tokio::test]
async fn exhausted_pager_chain_is_fatal() {
    for config in schedules() {
        let config = config.with_pager("most");
        let mut env = MockExecEnv::new().without("less").without("more");

        assert_eq!(
            Err(PipelineError::NoProgram(
                StageKind::Present,
                TriedPrograms(vec!["most".into(), "less".into(), "more".into()])
            )),
            run_with(&mut env, &config, &[]).await
        );
    }
}

#[tokio::test]
async fn only_missing_pagers_fall_back() {
    let config = Config::default().with_pager("most");
    let mut env = MockExecEnv::new().program("most", MockProgram::NotExecutable);

    assert_eq!(
        Err(PipelineError::Spawn(
            StageKind::Present,
            CommandError::NotExecutable("most".into())
        )),
        run_with(&mut env, &config, &[]).await
    );
    assert_eq!(vec!["printenv", "cat", "sort", "most"], env.attempted());
}

#[tokio::test]
async fn missing_stage_programs_do_not_fall_back() {
    let mut env = MockExecEnv::new().without("sort");

    assert_eq!(
        Err(PipelineError::Spawn(
            StageKind::Order,
            CommandError::NotFound("sort".into())
        )),
        run_with(&mut env, &Config::default(), &[]).await
    );
}

#[test]
fn describes_four_fixed_stages() {
    let config = Config::default().with_pager("most");
    let pipeline = Pipeline::new(&config, os_args(&["HOME"]));

    let kinds: Vec<_> = pipeline.stages().iter().map(|s| s.kind).collect();
    assert_eq!(
        vec![
            StageKind::Source,
            StageKind::Filter,
            StageKind::Order,
            StageKind::Present
        ],
        kinds
    );
    assert_eq!(os_args(&["grep"]), pipeline.stages()[1].programs);
    assert_eq!(os_args(&["most", "less", "more"]), pipeline.stages()[3].programs);
}
