use criterion::{Criterion, black_box, criterion_group, criterion_main};

use tile_scaler::{Activation, NetworkBuilder, dot};

fn dot_bench(c: &mut Criterion) {
    let a: Vec<f32> = (0..1024).map(|i| (i as f32).sin()).collect();
    let b: Vec<f32> = (0..1024).map(|i| (i as f32).cos()).collect();

    c.bench_function("dot_scalar_1024", |bench| {
        bench.iter(|| black_box(dot::dot_scalar(black_box(&a), black_box(&b), a.len())))
    });
    c.bench_function("dot_simd_1024", |bench| {
        bench.iter(|| black_box(dot::dot_simd(black_box(&a), black_box(&b), a.len())))
    });
}

fn network_forward_backward_bench(c: &mut Criterion) {
    let mut net = NetworkBuilder::new(64, 64)
        .unwrap()
        .hidden_layers(128, 2)
        .unwrap()
        .activation(Activation::LeakyReLU)
        .init_range(-0.9, 0.9)
        .unwrap()
        .build_with_seed(0)
        .unwrap();
    let input = vec![0.1_f32; net.input_count()];
    let target = vec![0.2_f32; net.output_count()];
    net.push_input(&input).unwrap();
    net.push_target(&target).unwrap();

    c.bench_function("network_forward_64_128x2_64", |b| {
        b.iter(|| {
            net.forward();
            black_box(net.loss());
        })
    });

    let mut ws = net.working_set();
    ws.push_input(&input).unwrap();
    ws.push_target(&target).unwrap();
    c.bench_function("working_set_forward_backward_64_128x2_64", |b| {
        b.iter(|| {
            ws.forward(black_box(&net)).unwrap();
            ws.backward(&net).unwrap();
            black_box(ws.loss());
        })
    });
}

criterion_group!(benches, dot_bench, network_forward_backward_bench);
criterion_main!(benches);
