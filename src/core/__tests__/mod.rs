mod model_test;
mod trainer_test;
