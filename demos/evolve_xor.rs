use neatrs_species::neural_network::NeuralNetwork;
use neatrs_species::Neat;

use ndarray::{array, Array1, Array2};
use rand::thread_rng;

fn main() {
    tracing_subscriber::fmt::init();

    struct XorReport {
        inputs: Array2<f64>,
        target: Array1<f64>,
        output: Array1<f64>,
        fitness: f64,
    }

    fn xor(nn: &NeuralNetwork) -> XorReport {
        let inputs = array![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];
        let target = array![0.0, 1.0, 1.0, 0.0];

        let mut output = Array1::<f64>::zeros(target.dim());
        for (i, row) in inputs.rows().into_iter().enumerate() {
            output[i] = match nn.predict(&row.to_vec()) {
                Ok(out) => out[0],
                Err(_) => 0.0,
            };
        }

        // 4 is a perfect score
        let absolute_diff = (&output - &target).mapv(f64::abs);
        let fitness = (4.0 - absolute_diff.sum()).powi(2);

        XorReport {
            inputs,
            target,
            output,
            fitness,
        }
    }

    fn xor_fitness(nn: &NeuralNetwork) -> f64 {
        xor(nn).fitness
    }

    fn print_report(generation: usize, report: &XorReport) {
        println!("generation {generation}: fitness {:.3}", report.fitness);
        println!("input_1,input_2,output,target");
        for i in 0..report.target.dim() {
            println!(
                "{},{},{:.3},{}",
                report.inputs[[i, 0]],
                report.inputs[[i, 1]],
                report.output[i],
                report.target[i]
            );
        }
    }

    let mut rng = thread_rng();
    let mut neat = match Neat::from_parameters("demos/parameters/evolve_xor.yaml", &mut rng) {
        Ok(neat) => neat,
        Err(e) => {
            eprintln!("unable to start: {e}");
            return;
        }
    };

    println!("Number of genomes at init: {}", neat.number_of_genomes());

    for _ in 0..10 {
        if let Err(e) = neat.evolve(10, xor_fitness, &mut rng) {
            eprintln!("evolution failed: {e}");
            return;
        }

        let generation = neat.community().generation();
        match (neat.champion(), neat.champion_network()) {
            (Ok(champion), Ok(network)) => {
                print_report(generation, &xor(&network));
                println!("{champion}");
            }
            (Err(e), _) | (_, Err(e)) => eprintln!("no champion: {e}"),
        }
    }
}
